//! Caption generation orchestration: primary pass, one-shot refinement, and
//! conversion of engine failures into typed results the UI can always render.

use std::fmt;
use std::path::Path;

use crate::caption::format::{format_caption, speech_rendering};
use crate::caption::policy::{
    params_for, refinement_params, should_refine, select_final, DetailLevel, SamplingParams,
};
use crate::engines::CaptionModel;
use crate::log_debug;

/// Spoken notice used instead of narrating raw error text to the user.
pub const SPEECH_FAILURE_NOTICE: &str =
    "Sorry, a description could not be generated for this image.";

/// Machine-inspectable failure categories for caption generation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CaptionErrorKind {
    /// The captioning engine never loaded; the feature is disabled this session.
    EngineUnavailable,
    /// The engine ran but the generate call failed.
    Generation,
    /// The engine returned nothing usable.
    EmptyOutput,
}

impl CaptionErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            CaptionErrorKind::EngineUnavailable => "engine_unavailable",
            CaptionErrorKind::Generation => "generation",
            CaptionErrorKind::EmptyOutput => "empty_output",
        }
    }
}

/// A caption failure that is still renderable: the display path shows the
/// message, the speech path substitutes a generic notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionError {
    pub kind: CaptionErrorKind,
    pub message: String,
}

impl fmt::Display for CaptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error generating caption: {}", self.message)
    }
}

/// A successfully generated, post-processed caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionResult {
    pub text: String,
    /// True when the refinement pass produced the final text.
    pub refined: bool,
}

pub type CaptionOutcome = Result<CaptionResult, CaptionError>;

/// Text shown on screen for an outcome. Failures render their message so the
/// user always sees why nothing was described.
pub fn display_text(outcome: &CaptionOutcome) -> String {
    match outcome {
        Ok(result) => result.text.clone(),
        Err(error) => error.to_string(),
    }
}

/// Text handed to the speech path. Failures map to a fixed spoken notice
/// rather than reading exception text aloud.
pub fn speech_text(outcome: &CaptionOutcome) -> String {
    match outcome {
        Ok(result) => speech_rendering(&result.text),
        Err(_) => SPEECH_FAILURE_NOTICE.to_string(),
    }
}

/// Run the caption pipeline for one image: generate at the requested tier,
/// post-process, and retry once with sampling if the very-detailed tier came
/// back short. Never panics and never propagates the engine's error type.
pub fn describe_image(
    model: &dyn CaptionModel,
    image: &Path,
    level: DetailLevel,
) -> CaptionOutcome {
    let params = params_for(level);
    let raw = model.generate(image, &params).map_err(|err| CaptionError {
        kind: CaptionErrorKind::Generation,
        message: format!("{err:#}"),
    })?;

    let primary = format_caption(&raw);
    if primary.is_empty() {
        return Err(CaptionError {
            kind: CaptionErrorKind::EmptyOutput,
            message: "the model returned an empty caption".to_string(),
        });
    }

    if !should_refine(level, &primary) {
        return Ok(CaptionResult {
            text: primary,
            refined: false,
        });
    }

    // One retry only; a failed or shorter refinement keeps the primary result.
    match model.generate(image, &refinement_params()) {
        Ok(second_raw) => {
            let refined = format_caption(&second_raw);
            let final_text = select_final(primary.clone(), refined);
            let used_refinement = final_text != primary;
            Ok(CaptionResult {
                text: final_text,
                refined: used_refinement,
            })
        }
        Err(err) => {
            log_debug(&format!("refinement pass failed, keeping primary: {err:#}"));
            Ok(CaptionResult {
                text: primary,
                refined: false,
            })
        }
    }
}

/// Generate several diverse captions for the same image by repeating a
/// sampled generate call. Empty results are skipped; the call fails only when
/// no caption at all could be produced.
pub fn generate_alternatives(
    model: &dyn CaptionModel,
    image: &Path,
    count: usize,
) -> Result<Vec<String>, CaptionError> {
    let mut params = params_for(DetailLevel::Detailed);
    params.sampling = Some(SamplingParams {
        top_k: 50,
        top_p: 0.95,
    });

    let mut captions = Vec::with_capacity(count);
    let mut last_error: Option<String> = None;
    for _ in 0..count {
        match model.generate(image, &params) {
            Ok(raw) => {
                let formatted = format_caption(&raw);
                if !formatted.is_empty() {
                    captions.push(formatted);
                }
            }
            Err(err) => last_error = Some(format!("{err:#}")),
        }
    }

    if captions.is_empty() {
        return Err(CaptionError {
            kind: CaptionErrorKind::Generation,
            message: last_error.unwrap_or_else(|| "no captions produced".to_string()),
        });
    }
    Ok(captions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Caption model stub that replays a scripted sequence of results.
    struct ScriptedModel {
        responses: Mutex<Vec<anyhow::Result<String>>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<anyhow::Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    impl CaptionModel for ScriptedModel {
        fn generate(
            &self,
            _image: &Path,
            _params: &crate::caption::policy::GenerationParams,
        ) -> anyhow::Result<String> {
            let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
            if responses.is_empty() {
                return Err(anyhow!("scripted model exhausted"));
            }
            responses.remove(0)
        }
    }

    fn image() -> PathBuf {
        PathBuf::from("photo.jpg")
    }

    #[test]
    fn detailed_tier_formats_without_refinement() {
        let model = ScriptedModel::new(vec![Ok("a dog on a couch".to_string())]);
        let outcome = describe_image(&model, &image(), DetailLevel::Detailed);
        let result = outcome.expect("caption should succeed");
        assert_eq!(result.text, "A dog on a couch.");
        assert!(!result.refined);
    }

    #[test]
    fn very_detailed_short_caption_takes_longer_retry() {
        let long = "a small brown dog sits on bright green grass in a sunny backyard \
                    next to a wooden fence while two children play nearby with a ball";
        let model = ScriptedModel::new(vec![
            Ok("a dog on grass".to_string()),
            Ok(long.to_string()),
        ]);
        let result = describe_image(&model, &image(), DetailLevel::VeryDetailed)
            .expect("caption should succeed");
        assert!(result.refined);
        assert!(result.text.starts_with("A small brown dog"));
    }

    #[test]
    fn shorter_retry_is_discarded() {
        let model = ScriptedModel::new(vec![
            Ok("a dog on green grass near a fence".to_string()),
            Ok("a dog".to_string()),
        ]);
        let result = describe_image(&model, &image(), DetailLevel::VeryDetailed)
            .expect("caption should succeed");
        assert!(!result.refined);
        assert_eq!(result.text, "A dog on green grass near a fence.");
    }

    #[test]
    fn failed_retry_keeps_primary_caption() {
        let model = ScriptedModel::new(vec![
            Ok("a dog on grass".to_string()),
            Err(anyhow!("generation backend crashed")),
        ]);
        let result = describe_image(&model, &image(), DetailLevel::VeryDetailed)
            .expect("primary caption should survive a failed retry");
        assert_eq!(result.text, "A dog on grass.");
    }

    #[test]
    fn long_very_detailed_caption_skips_refinement() {
        let long = "a busy street market with dozens of stalls selling fruit and \
                    vegetables under colorful awnings while shoppers walk between them";
        let model = ScriptedModel::new(vec![Ok(long.to_string())]);
        let result = describe_image(&model, &image(), DetailLevel::VeryDetailed)
            .expect("caption should succeed");
        assert!(!result.refined);
    }

    #[test]
    fn generation_failure_becomes_typed_error() {
        let model = ScriptedModel::new(vec![Err(anyhow!("model not loaded"))]);
        let outcome = describe_image(&model, &image(), DetailLevel::Brief);
        let error = outcome.expect_err("failure should surface as CaptionError");
        assert_eq!(error.kind, CaptionErrorKind::Generation);
        assert!(error.message.contains("model not loaded"));
    }

    #[test]
    fn empty_model_output_is_its_own_error_kind() {
        let model = ScriptedModel::new(vec![Ok("   ".to_string())]);
        let error = describe_image(&model, &image(), DetailLevel::Brief)
            .expect_err("empty output should fail");
        assert_eq!(error.kind, CaptionErrorKind::EmptyOutput);
    }

    #[test]
    fn display_text_renders_error_message() {
        let outcome: CaptionOutcome = Err(CaptionError {
            kind: CaptionErrorKind::Generation,
            message: "boom".to_string(),
        });
        assert_eq!(display_text(&outcome), "Error generating caption: boom");
    }

    #[test]
    fn speech_text_substitutes_generic_failure_notice() {
        let outcome: CaptionOutcome = Err(CaptionError {
            kind: CaptionErrorKind::Generation,
            message: "CUDA out of memory at 0x7fff".to_string(),
        });
        let spoken = speech_text(&outcome);
        assert_eq!(spoken, SPEECH_FAILURE_NOTICE);
        assert!(!spoken.contains("CUDA"));
    }

    #[test]
    fn speech_text_prefixes_successful_captions() {
        let outcome: CaptionOutcome = Ok(CaptionResult {
            text: "A red car.".to_string(),
            refined: false,
        });
        assert_eq!(speech_text(&outcome), "This image shows: A red car.");
    }

    #[test]
    fn alternatives_skip_empty_and_failed_samples() {
        let model = ScriptedModel::new(vec![
            Ok("a dog".to_string()),
            Ok("".to_string()),
            Err(anyhow!("sampling hiccup")),
            Ok("a brown dog outdoors".to_string()),
        ]);
        let captions = generate_alternatives(&model, &image(), 4).expect("some captions");
        assert_eq!(captions, vec!["A dog.", "A brown dog outdoors."]);
    }

    #[test]
    fn alternatives_fail_when_nothing_was_produced() {
        let model = ScriptedModel::new(vec![Err(anyhow!("dead")), Err(anyhow!("still dead"))]);
        let error = generate_alternatives(&model, &image(), 2).expect_err("all calls failed");
        assert_eq!(error.kind, CaptionErrorKind::Generation);
    }
}
