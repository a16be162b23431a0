use std::process::Command;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn narrator_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_narrator").expect("narrator test binary not built")
}

#[test]
fn narrator_help_mentions_name() {
    let output = Command::new(narrator_bin())
        .arg("--help")
        .output()
        .expect("run narrator --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("Image Narrator"));
}

#[test]
fn narrator_doctor_reports_engine_state() {
    let output = Command::new(narrator_bin())
        .arg("--doctor")
        .output()
        .expect("run narrator --doctor");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("[Engine scripts]"));
    assert!(combined.contains("[Features]"));
}

#[test]
fn narrator_rejects_out_of_range_confidence() {
    let output = Command::new(narrator_bin())
        .args(["--ocr-confidence", "2.0", "--doctor"])
        .output()
        .expect("run narrator with bad confidence");
    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("--ocr-confidence"));
}

#[test]
fn narrator_once_requires_an_image() {
    let output = Command::new(narrator_bin())
        .arg("--once")
        .output()
        .expect("run narrator --once");
    assert!(!output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("--once requires --image"));
}
