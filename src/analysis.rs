//! One analysis request end to end: caption policy → generation → OCR →
//! speech-text assembly → synthesis and the retention sweep. Every failure
//! mode degrades; the report always carries something displayable.

use std::path::PathBuf;
use std::time::Instant;

use crate::caption::{self, CaptionError, CaptionErrorKind, CaptionOutcome, DetailLevel};
use crate::config::AppConfig;
use crate::engines::Engines;
use crate::image::ImageInput;
use crate::ocr::{extract_text, OcrOutput};
use crate::tts::{enforce_retention, synthesize_description};
use crate::log_debug;

/// Everything one request produced. Request-scoped; nothing here outlives the
/// render of its results.
#[derive(Debug)]
pub struct AnalysisReport {
    pub detail_level: DetailLevel,
    pub caption: CaptionOutcome,
    /// `None` when OCR is toggled off or its engine failed to load.
    pub ocr: Option<OcrOutput>,
    /// Full text handed to the speech path.
    pub speech_text: String,
    /// Synthesized artifact, when TTS was available and succeeded.
    pub audio: Option<PathBuf>,
}

impl AnalysisReport {
    /// Caption text for the on-screen description section.
    pub fn display_caption(&self) -> String {
        caption::display_text(&self.caption)
    }

    /// OCR section text, present only when OCR ran.
    pub fn display_ocr(&self) -> Option<String> {
        self.ocr.as_ref().map(|output| output.speech_summary())
    }
}

/// Run one full analysis. Blocking: each engine call runs to completion
/// before the next starts, matching the one-request-at-a-time session model.
pub fn run_analysis(engines: &Engines, config: &AppConfig, image: &ImageInput) -> AnalysisReport {
    let started = Instant::now();
    let detail_level = config.detail_level();

    let caption_outcome = match &engines.caption {
        Some(model) => caption::describe_image(model.as_ref(), image.path(), detail_level),
        None => Err(CaptionError {
            kind: CaptionErrorKind::EngineUnavailable,
            message: "captioning is disabled for this session".to_string(),
        }),
    };

    let ocr_output = if config.enable_ocr() {
        engines
            .ocr
            .as_ref()
            .map(|engine| extract_text(engine.as_ref(), image.path(), config.ocr_confidence))
    } else {
        None
    };

    let speech_text = assemble_speech_text(&caption_outcome, ocr_output.as_ref());

    let audio = engines.tts.as_ref().and_then(|synth| {
        let artifact = synthesize_description(
            synth.as_ref(),
            &speech_text,
            &config.audio_dir,
            &config.audio_format,
        );
        if artifact.is_some() {
            match enforce_retention(&config.audio_dir, config.audio_max_files, &config.audio_format)
            {
                Ok(removed) if removed > 0 => {
                    log_debug(&format!("retention sweep removed {removed} old artifacts"));
                }
                Ok(_) => {}
                Err(err) => log_debug(&format!("retention sweep failed: {err:#}")),
            }
        }
        artifact
    });

    if config.log_timings {
        log_debug(&format!(
            "timing|phase=analysis|detail={}|elapsed_s={:.3}|ocr={}|audio={}",
            detail_level.label(),
            started.elapsed().as_secs_f64(),
            ocr_output.is_some(),
            audio.is_some()
        ));
    }
    tracing::info!(
        detail = detail_level.label(),
        caption_ok = caption_outcome.is_ok(),
        ocr = ocr_output.is_some(),
        audio = audio.is_some(),
        "analysis complete"
    );

    AnalysisReport {
        detail_level,
        caption: caption_outcome,
        ocr: ocr_output,
        speech_text,
        audio,
    }
}

/// Speech text: spoken caption (or generic failure notice) plus the OCR
/// summary, appended only when text was actually found.
fn assemble_speech_text(outcome: &CaptionOutcome, ocr: Option<&OcrOutput>) -> String {
    let mut speech = caption::speech_text(outcome);
    if let Some(output) = ocr {
        if output.has_text() {
            speech.push(' ');
            speech.push_str(&output.speech_summary());
        }
    }
    speech
}
