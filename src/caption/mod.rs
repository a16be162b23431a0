//! Caption generation: detail-level policy, post-processing, and the
//! orchestration that turns raw model output into display/speech text.

mod format;
mod pipeline;
mod policy;

pub use format::{format_caption, speech_rendering, SPEECH_PREFIX};
pub use pipeline::{
    describe_image, display_text, generate_alternatives, speech_text, CaptionError,
    CaptionErrorKind, CaptionOutcome, CaptionResult, SPEECH_FAILURE_NOTICE,
};
pub use policy::{
    params_for, refinement_params, should_refine, word_count, DetailLevel, GenerationParams,
    SamplingParams, REFINEMENT_MIN_WORDS,
};
