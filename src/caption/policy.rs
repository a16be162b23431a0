//! Detail-level policy: maps the user-selected tier to generation parameters
//! and decides when a short "very detailed" caption earns one refinement pass.

use anyhow::{bail, Result};
use serde::Serialize;

/// Word-count floor under which a very-detailed caption triggers a refinement pass.
pub const REFINEMENT_MIN_WORDS: usize = 20;

/// User-selected caption verbosity tier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DetailLevel {
    Brief,
    #[default]
    Detailed,
    VeryDetailed,
}

impl DetailLevel {
    /// Parse a user-supplied tier name. Unrecognized values fall back to
    /// `Detailed` so a bad setting never blocks an analysis.
    pub fn from_user_input(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "brief" => DetailLevel::Brief,
            "very_detailed" | "very detailed" => DetailLevel::VeryDetailed,
            _ => DetailLevel::Detailed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetailLevel::Brief => "brief",
            DetailLevel::Detailed => "detailed",
            DetailLevel::VeryDetailed => "very_detailed",
        }
    }
}

/// Top-k/top-p sampling knobs, present only when sampling is enabled.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SamplingParams {
    pub top_k: u32,
    pub top_p: f32,
}

/// Structured parameters handed to the caption model's generate call.
/// Replaces the loose "dict of kwargs" shape with a validated type.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_length: u32,
    pub min_length: u32,
    pub beam_count: u32,
    pub temperature: f32,
    pub repetition_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingParams>,
}

impl GenerationParams {
    /// Build a parameter set, rejecting shapes the model would choke on.
    pub fn new(
        max_length: u32,
        min_length: u32,
        beam_count: u32,
        temperature: f32,
        repetition_penalty: f32,
        sampling: Option<SamplingParams>,
    ) -> Result<Self> {
        if min_length > max_length {
            bail!("min_length ({min_length}) cannot exceed max_length ({max_length})");
        }
        if beam_count == 0 {
            bail!("beam_count must be at least 1");
        }
        Ok(Self {
            max_length,
            min_length,
            beam_count,
            temperature,
            repetition_penalty,
            sampling,
        })
    }
}

/// Generation parameters for a detail tier, per the fixed policy table.
pub fn params_for(level: DetailLevel) -> GenerationParams {
    let (max_length, min_length, beam_count, temperature, repetition_penalty) = match level {
        DetailLevel::Brief => (30, 10, 3, 1.0, 1.0),
        DetailLevel::Detailed => (50, 20, 5, 1.0, 1.1),
        DetailLevel::VeryDetailed => (100, 30, 8, 0.9, 1.2),
    };
    GenerationParams {
        max_length,
        min_length,
        beam_count,
        temperature,
        repetition_penalty,
        sampling: None,
    }
}

/// Parameters for the one-shot refinement retry on the very-detailed tier.
pub fn refinement_params() -> GenerationParams {
    GenerationParams {
        max_length: 150,
        min_length: 30,
        beam_count: 10,
        temperature: 0.9,
        repetition_penalty: 1.2,
        sampling: Some(SamplingParams {
            top_k: 50,
            top_p: 0.95,
        }),
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// A refinement pass is warranted only when the user asked for maximum detail
/// and the primary caption still came back short.
pub fn should_refine(level: DetailLevel, primary_caption: &str) -> bool {
    level == DetailLevel::VeryDetailed && word_count(primary_caption) < REFINEMENT_MIN_WORDS
}

/// Keep the refined caption only when it actually says more.
pub fn select_final(primary: String, refined: String) -> String {
    if word_count(&refined) > word_count(&primary) {
        refined
    } else {
        primary
    }
}
