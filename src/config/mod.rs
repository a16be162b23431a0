//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub use defaults::{
    ALLOWED_AUDIO_FORMATS, DEFAULT_AUDIO_MAX_FILES, DEFAULT_LISTEN_TIMEOUT_MS,
    DEFAULT_OCR_CONFIDENCE, MAX_AUDIO_MAX_FILES, MAX_LISTEN_TIMEOUT_MS, MIN_LISTEN_TIMEOUT_MS,
    PLAYBACK_SPEEDS,
};
use defaults::{
    DEFAULT_AUDIO_DIR, DEFAULT_AUDIO_FORMAT, DEFAULT_CAPTION_SCRIPT, DEFAULT_DETAIL_LEVEL,
    DEFAULT_LANGUAGE, DEFAULT_LISTEN_SCRIPT, DEFAULT_OCR_SCRIPT, DEFAULT_PLAYBACK_SPEED,
    DEFAULT_TTS_SCRIPT,
};

use crate::caption::DetailLevel;

/// CLI options for the Image Narrator session. Validated values keep the
/// helper subprocesses and the audio directory safe.
#[derive(Debug, Parser, Clone)]
#[command(
    about = "Image Narrator: spoken descriptions of photographs",
    author,
    version
)]
pub struct AppConfig {
    /// Image to analyze on startup
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Analyze the image and exit instead of starting the interactive session
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Caption detail level: brief, detailed, or very_detailed
    #[arg(long = "detail", env = "NARRATOR_DETAIL", default_value = DEFAULT_DETAIL_LEVEL)]
    pub detail: String,

    /// Disable text extraction (OCR)
    #[arg(long = "no-ocr", default_value_t = false)]
    pub no_ocr: bool,

    /// Minimum OCR confidence for a text span to be retained
    #[arg(long = "ocr-confidence", default_value_t = DEFAULT_OCR_CONFIDENCE, allow_negative_numbers = true)]
    pub ocr_confidence: f32,

    /// Disable automatic audio narration after analysis
    #[arg(long = "no-auto-play", default_value_t = false)]
    pub no_auto_play: bool,

    /// Playback speed label shown next to the audio artifact (cosmetic)
    #[arg(long = "playback-speed", default_value = DEFAULT_PLAYBACK_SPEED)]
    pub playback_speed: String,

    /// Enable voice commands
    #[arg(long = "voice", default_value_t = false)]
    pub enable_voice: bool,

    /// Voice capture window in milliseconds
    #[arg(long = "listen-timeout-ms", default_value_t = DEFAULT_LISTEN_TIMEOUT_MS)]
    pub listen_timeout_ms: u64,

    /// Directory for synthesized audio artifacts
    #[arg(long = "audio-dir", env = "NARRATOR_AUDIO_DIR", default_value = DEFAULT_AUDIO_DIR)]
    pub audio_dir: PathBuf,

    /// Audio artifact format/extension
    #[arg(long = "audio-format", default_value = DEFAULT_AUDIO_FORMAT)]
    pub audio_format: String,

    /// Maximum synthesized artifacts kept on disk; oldest are evicted
    #[arg(long = "audio-max-files", default_value_t = DEFAULT_AUDIO_MAX_FILES)]
    pub audio_max_files: usize,

    /// Language code for synthesis and recognition
    #[arg(long, env = "NARRATOR_LANG", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Generate this many alternative captions after the main description (0 disables)
    #[arg(long = "alternatives", default_value_t = 0)]
    pub alternatives: usize,

    /// Path to the python interpreter used for engine helper scripts
    #[arg(long, default_value = "python3")]
    pub python_cmd: String,

    /// Captioning helper script location
    #[arg(long = "caption-script", default_value = DEFAULT_CAPTION_SCRIPT)]
    pub caption_script: PathBuf,

    /// OCR helper script location
    #[arg(long = "ocr-script", default_value = DEFAULT_OCR_SCRIPT)]
    pub ocr_script: PathBuf,

    /// Text-to-speech helper script location
    #[arg(long = "tts-script", default_value = DEFAULT_TTS_SCRIPT)]
    pub tts_script: PathBuf,

    /// Voice capture helper script location
    #[arg(long = "listen-script", default_value = DEFAULT_LISTEN_SCRIPT)]
    pub listen_script: PathBuf,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "NARRATOR_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "NARRATOR_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,

    /// Print environment diagnostics and exit
    #[arg(long = "doctor", default_value_t = false)]
    pub doctor: bool,
}

impl AppConfig {
    /// The parsed detail tier; unrecognized values fall back to `detailed`.
    pub fn detail_level(&self) -> DetailLevel {
        DetailLevel::from_user_input(&self.detail)
    }

    pub fn enable_ocr(&self) -> bool {
        !self.no_ocr
    }

    pub fn auto_play(&self) -> bool {
        !self.no_auto_play
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_millis(self.listen_timeout_ms)
    }
}
