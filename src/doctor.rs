//! Environment diagnostics for `--doctor`: which engines can load, where the
//! audio directory lives, and what the session will run with.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::engines::Engines;

/// Key/value report printed by `--doctor`.
#[derive(Debug, Default)]
pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn section(&mut self, title: &str) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(format!("[{title}]"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl std::fmt::Display) {
        self.lines.push(format!("  {key}: {value}"));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

fn script_status(path: &Path) -> &'static str {
    if path.is_file() {
        "found"
    } else {
        "missing"
    }
}

/// Build the full diagnostics report for the current configuration.
pub fn doctor_report(config: &AppConfig, engines: &Engines) -> DoctorReport {
    let mut report = DoctorReport::default();

    report.section("Narrator");
    report.push_kv("version", env!("CARGO_PKG_VERSION"));
    report.push_kv("detail_level", config.detail_level().label());
    report.push_kv("language", &config.language);

    report.section("Engine scripts");
    report.push_kv("python_cmd", &config.python_cmd);
    report.push_kv(
        "caption_script",
        format!(
            "{} ({})",
            config.caption_script.display(),
            script_status(&config.caption_script)
        ),
    );
    report.push_kv(
        "ocr_script",
        format!(
            "{} ({})",
            config.ocr_script.display(),
            script_status(&config.ocr_script)
        ),
    );
    report.push_kv(
        "tts_script",
        format!(
            "{} ({})",
            config.tts_script.display(),
            script_status(&config.tts_script)
        ),
    );
    report.push_kv(
        "listen_script",
        format!(
            "{} ({})",
            config.listen_script.display(),
            script_status(&config.listen_script)
        ),
    );

    report.section("Features");
    report.push_kv("captioning", engine_state(engines.caption.is_some()));
    report.push_kv(
        "ocr",
        if !config.enable_ocr() {
            "off"
        } else {
            engine_state(engines.ocr.is_some())
        },
    );
    report.push_kv("speech_synthesis", engine_state(engines.tts.is_some()));
    report.push_kv(
        "voice_commands",
        if !config.enable_voice {
            "off"
        } else {
            engine_state(engines.transcriber.is_some())
        },
    );
    report.push_kv("ocr_confidence", config.ocr_confidence);
    report.push_kv("auto_play", config.auto_play());

    report.section("Audio output");
    report.push_kv("dir", config.audio_dir.display());
    report.push_kv("writable", audio_dir_writable(config));
    report.push_kv("format", &config.audio_format);
    report.push_kv("max_files", config.audio_max_files);

    if !engines.load_errors.is_empty() {
        report.section("Load errors");
        for error in &engines.load_errors {
            report.push_kv("error", error);
        }
    }

    report
}

fn engine_state(loaded: bool) -> &'static str {
    if loaded {
        "available"
    } else {
        "disabled"
    }
}

fn audio_dir_writable(config: &AppConfig) -> bool {
    if fs::create_dir_all(&config.audio_dir).is_err() {
        return false;
    }
    let probe = config.audio_dir.join(".narrator_probe");
    let ok = fs::write(&probe, b"probe").is_ok();
    let _ = fs::remove_file(&probe);
    ok
}
