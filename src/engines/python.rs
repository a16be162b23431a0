//! Subprocess bridge to the Python model stack (BLIP captioning, EasyOCR,
//! gTTS, SpeechRecognition). Each helper script reads arguments, does one
//! job, and emits a single JSON payload on stdout.
//!
//! Protocol per helper:
//! - caption:  `--image <path> --params <json>`        → `{"caption": "..."}`
//! - ocr:      `--image <path> --min-confidence <f32>` → `{"spans": [{"text", "confidence", "bbox"}]}`
//! - tts:      `--text <str> --output <path> --lang <code>` → writes the artifact, exits 0
//! - listen:   `--timeout-ms <u64> --lang <code>`      → `{"transcript": "..."}` (null on silence)

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::caption::GenerationParams;
use crate::ocr::OcrSpan;

use super::{CaptionModel, OcrEngine, SpeechSynthesizer, SpeechTranscriber};

// Poll interval while waiting on a deadline-bounded helper.
const HELPER_POLL: Duration = Duration::from_millis(50);

/// Shared plumbing for one helper script.
#[derive(Debug, Clone)]
struct PyHelper {
    python_cmd: String,
    script: PathBuf,
}

impl PyHelper {
    fn new(python_cmd: &str, script: &Path) -> Result<Self> {
        if !script.is_file() {
            bail!("helper script not found: {}", script.display());
        }
        Ok(Self {
            python_cmd: python_cmd.to_string(),
            script: script.to_path_buf(),
        })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.python_cmd);
        cmd.arg(&self.script);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Run to completion and parse the JSON payload from stdout.
    fn run_json<T: DeserializeOwned>(&self, cmd: &mut Command) -> Result<T> {
        let output = cmd.output().with_context(|| {
            format!("failed to run helper script {}", self.script.display())
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            bail!(
                "helper {} failed with status {}.\nstdout:\n{}\nstderr:\n{}",
                self.script.display(),
                output.status,
                stdout.trim(),
                stderr.trim()
            );
        }
        parse_json_payload(&stdout).with_context(|| {
            format!("helper {} did not emit valid JSON", self.script.display())
        })
    }

    /// Run with a hard deadline, killing the helper if it overstays.
    fn run_json_with_deadline<T: DeserializeOwned>(
        &self,
        cmd: &mut Command,
        deadline: Duration,
    ) -> Result<Option<T>> {
        let mut child = cmd.spawn().with_context(|| {
            format!("failed to run helper script {}", self.script.display())
        })?;
        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let mut stdout = String::new();
                    let mut stderr = String::new();
                    if let Some(mut out) = child.stdout.take() {
                        let _ = out.read_to_string(&mut stdout);
                    }
                    if let Some(mut err) = child.stderr.take() {
                        let _ = err.read_to_string(&mut stderr);
                    }
                    if !status.success() {
                        bail!(
                            "helper {} failed with status {}.\nstderr:\n{}",
                            self.script.display(),
                            status,
                            stderr.trim()
                        );
                    }
                    return Ok(Some(parse_json_payload(&stdout)?));
                }
                Ok(None) => {
                    if started.elapsed() > deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Ok(None);
                    }
                    thread::sleep(HELPER_POLL);
                }
                Err(err) => return Err(anyhow!("helper wait failed: {err}")),
            }
        }
    }
}

/// Parse the payload from helper stdout. Tries the whole output first, then
/// scans lines in reverse for a JSON object so stray prints above the payload
/// do not break the bridge.
fn parse_json_payload<T: DeserializeOwned>(stdout: &str) -> Result<T> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        bail!("helper emitted no output");
    }
    let mut last_error = match serde_json::from_str::<T>(trimmed) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };
    for line in stdout.lines().rev() {
        let mut candidate = line.trim();
        if let Some(rest) = candidate.strip_prefix("JSON:") {
            candidate = rest.trim();
        }
        if !(candidate.starts_with('{') && candidate.ends_with('}')) {
            continue;
        }
        match serde_json::from_str::<T>(candidate) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => last_error = err,
        }
    }
    Err(anyhow!("no JSON payload in helper output: {last_error}"))
}

#[derive(Debug, Deserialize)]
struct CaptionPayload {
    caption: String,
}

/// BLIP captioning behind a helper script.
pub struct PyCaptionModel {
    helper: PyHelper,
}

impl PyCaptionModel {
    pub fn new(python_cmd: &str, script: &Path) -> Result<Self> {
        Ok(Self {
            helper: PyHelper::new(python_cmd, script)?,
        })
    }
}

impl CaptionModel for PyCaptionModel {
    fn generate(&self, image: &Path, params: &GenerationParams) -> Result<String> {
        let params_json =
            serde_json::to_string(params).context("serialize generation parameters")?;
        let mut cmd = self.helper.command();
        cmd.arg("--image").arg(image);
        cmd.args(["--params", &params_json]);
        let payload: CaptionPayload = self.helper.run_json(&mut cmd)?;
        Ok(payload.caption)
    }
}

#[derive(Debug, Deserialize)]
struct OcrPayload {
    #[serde(default)]
    spans: Vec<OcrSpan>,
}

/// EasyOCR behind a helper script.
pub struct PyOcrEngine {
    helper: PyHelper,
}

impl PyOcrEngine {
    pub fn new(python_cmd: &str, script: &Path) -> Result<Self> {
        Ok(Self {
            helper: PyHelper::new(python_cmd, script)?,
        })
    }
}

impl OcrEngine for PyOcrEngine {
    fn extract(&self, image: &Path, confidence_threshold: f32) -> Result<Vec<OcrSpan>> {
        let mut cmd = self.helper.command();
        cmd.arg("--image").arg(image);
        cmd.args(["--min-confidence", &confidence_threshold.to_string()]);
        let payload: OcrPayload = self.helper.run_json(&mut cmd)?;
        Ok(payload.spans)
    }
}

/// gTTS behind a helper script. Success means the artifact exists on disk.
pub struct PySpeechSynthesizer {
    helper: PyHelper,
    language: String,
}

impl PySpeechSynthesizer {
    pub fn new(python_cmd: &str, script: &Path, language: &str) -> Result<Self> {
        Ok(Self {
            helper: PyHelper::new(python_cmd, script)?,
            language: language.to_string(),
        })
    }
}

impl SpeechSynthesizer for PySpeechSynthesizer {
    fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        let mut cmd = self.helper.command();
        cmd.args(["--text", text]);
        cmd.arg("--output").arg(output);
        cmd.args(["--lang", &self.language]);
        let result = cmd.output().with_context(|| {
            format!("failed to run helper script {}", self.helper.script.display())
        })?;
        if !result.status.success() {
            bail!(
                "tts helper failed with status {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }
        if !output.is_file() {
            bail!("tts helper reported success but wrote no artifact");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptPayload {
    transcript: Option<String>,
}

/// SpeechRecognition microphone capture behind a helper script.
pub struct PySpeechTranscriber {
    helper: PyHelper,
    language: String,
}

impl PySpeechTranscriber {
    pub fn new(python_cmd: &str, script: &Path, language: &str) -> Result<Self> {
        Ok(Self {
            helper: PyHelper::new(python_cmd, script)?,
            language: language.to_string(),
        })
    }
}

impl SpeechTranscriber for PySpeechTranscriber {
    fn listen(&self, timeout: Duration) -> Result<Option<String>> {
        let mut cmd = self.helper.command();
        cmd.args(["--timeout-ms", &timeout.as_millis().to_string()]);
        cmd.args(["--lang", &self.language]);
        // Grace period on top of the capture window for recognition latency.
        let deadline = timeout + Duration::from_secs(10);
        let payload: Option<TranscriptPayload> =
            self.helper.run_json_with_deadline(&mut cmd, deadline)?;
        Ok(payload.and_then(|p| p.transcript))
    }
}
