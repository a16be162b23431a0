//! Seams to the external engines: captioning model, OCR reader, speech
//! synthesizer, and speech recognizer. Each is loaded once at startup and
//! reused read-only; a load failure disables that feature for the session
//! instead of failing the whole app.

mod python;

pub use python::{PyCaptionModel, PyOcrEngine, PySpeechSynthesizer, PySpeechTranscriber};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::caption::GenerationParams;
use crate::config::AppConfig;
use crate::log_debug;
use crate::ocr::OcrSpan;

/// Captioning model: produces a raw caption for an image.
pub trait CaptionModel: Send + Sync {
    fn generate(&self, image: &Path, params: &GenerationParams) -> Result<String>;
}

/// OCR reader: locates text spans with confidence scores.
pub trait OcrEngine: Send + Sync {
    fn extract(&self, image: &Path, confidence_threshold: f32) -> Result<Vec<OcrSpan>>;
}

/// Text-to-speech: renders text into an audio artifact at `output`.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str, output: &Path) -> Result<()>;
}

/// Speech recognizer: captures one utterance within the timeout.
/// `Ok(None)` means the capture timed out or heard nothing.
pub trait SpeechTranscriber: Send + Sync {
    fn listen(&self, timeout: Duration) -> Result<Option<String>>;
}

/// Service handles constructed once at process start. A missing engine means
/// the corresponding feature is disabled for the rest of the session.
#[derive(Default)]
pub struct Engines {
    pub caption: Option<Arc<dyn CaptionModel>>,
    pub ocr: Option<Arc<dyn OcrEngine>>,
    pub tts: Option<Arc<dyn SpeechSynthesizer>>,
    pub transcriber: Option<Arc<dyn SpeechTranscriber>>,
    /// One human-readable line per engine that failed to load.
    pub load_errors: Vec<String>,
}

impl Engines {
    /// Construct every configured engine, collecting load failures instead of
    /// propagating them.
    pub fn load(config: &AppConfig) -> Self {
        let mut engines = Engines::default();

        match PyCaptionModel::new(&config.python_cmd, &config.caption_script) {
            Ok(model) => engines.caption = Some(Arc::new(model)),
            Err(err) => engines.record_failure("captioning", err),
        }

        if config.enable_ocr() {
            match PyOcrEngine::new(&config.python_cmd, &config.ocr_script) {
                Ok(engine) => engines.ocr = Some(Arc::new(engine)),
                Err(err) => engines.record_failure("text extraction", err),
            }
        }

        match PySpeechSynthesizer::new(&config.python_cmd, &config.tts_script, &config.language) {
            Ok(synth) => engines.tts = Some(Arc::new(synth)),
            Err(err) => engines.record_failure("speech synthesis", err),
        }

        if config.enable_voice {
            match PySpeechTranscriber::new(
                &config.python_cmd,
                &config.listen_script,
                &config.language,
            ) {
                Ok(transcriber) => engines.transcriber = Some(Arc::new(transcriber)),
                Err(err) => engines.record_failure("voice commands", err),
            }
        }

        engines
    }

    fn record_failure(&mut self, feature: &str, err: anyhow::Error) {
        let line = format!("{feature} unavailable: {err:#}");
        log_debug(&line);
        self.load_errors.push(line);
    }

    /// No engines at all; used by dry runs and tests.
    pub fn disabled() -> Self {
        Engines::default()
    }
}
