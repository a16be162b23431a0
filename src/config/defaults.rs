//! Default values and bounds shared by parsing and validation.

pub const DEFAULT_DETAIL_LEVEL: &str = "detailed";
pub const DEFAULT_OCR_CONFIDENCE: f32 = 0.3;
pub const DEFAULT_LANGUAGE: &str = "en";

pub const DEFAULT_AUDIO_DIR: &str = "audio_outputs";
pub const DEFAULT_AUDIO_FORMAT: &str = "mp3";
pub const DEFAULT_AUDIO_MAX_FILES: usize = 10;
pub const MAX_AUDIO_MAX_FILES: usize = 1_000;

pub const DEFAULT_LISTEN_TIMEOUT_MS: u64 = 3_000;
pub const MIN_LISTEN_TIMEOUT_MS: u64 = 500;
pub const MAX_LISTEN_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_CAPTION_SCRIPT: &str = "scripts/caption_engine.py";
pub const DEFAULT_OCR_SCRIPT: &str = "scripts/ocr_engine.py";
pub const DEFAULT_TTS_SCRIPT: &str = "scripts/tts_engine.py";
pub const DEFAULT_LISTEN_SCRIPT: &str = "scripts/listen_engine.py";

/// Audio container formats the synthesis helper can emit.
pub const ALLOWED_AUDIO_FORMATS: &[&str] = &["mp3", "wav", "ogg"];

/// Playback-speed labels offered by the session (cosmetic; synthesized audio
/// is unchanged).
pub const PLAYBACK_SPEEDS: &[&str] = &["0.75x", "1.0x", "1.25x", "1.5x"];
pub const DEFAULT_PLAYBACK_SPEED: &str = "1.0x";
