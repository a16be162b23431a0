use anyhow::{bail, Result};
use clap::Parser;

use super::defaults::ALLOWED_AUDIO_FORMATS;
use super::{
    AppConfig, MAX_AUDIO_MAX_FILES, MAX_LISTEN_TIMEOUT_MS, MIN_LISTEN_TIMEOUT_MS, PLAYBACK_SPEEDS,
};

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize the ones other layers rely on.
    pub fn validate(&mut self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ocr_confidence) {
            bail!(
                "--ocr-confidence must be between 0.0 and 1.0, got {}",
                self.ocr_confidence
            );
        }

        if !(MIN_LISTEN_TIMEOUT_MS..=MAX_LISTEN_TIMEOUT_MS).contains(&self.listen_timeout_ms) {
            bail!(
                "--listen-timeout-ms must be between {MIN_LISTEN_TIMEOUT_MS} and {MAX_LISTEN_TIMEOUT_MS}, got {}",
                self.listen_timeout_ms
            );
        }

        if self.audio_max_files == 0 || self.audio_max_files > MAX_AUDIO_MAX_FILES {
            bail!(
                "--audio-max-files must be between 1 and {MAX_AUDIO_MAX_FILES}, got {}",
                self.audio_max_files
            );
        }

        self.audio_format = self.audio_format.trim().to_ascii_lowercase();
        if !ALLOWED_AUDIO_FORMATS.contains(&self.audio_format.as_str()) {
            bail!(
                "--audio-format must be one of {}, got {}",
                ALLOWED_AUDIO_FORMATS.join(", "),
                self.audio_format
            );
        }

        self.language = self.language.trim().to_ascii_lowercase();
        if self.language.len() != 2 || !self.language.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!(
                "--language must be a two-letter ISO 639-1 code, got {}",
                self.language
            );
        }

        if !PLAYBACK_SPEEDS.contains(&self.playback_speed.as_str()) {
            bail!(
                "--playback-speed must be one of {}, got {}",
                PLAYBACK_SPEEDS.join(", "),
                self.playback_speed
            );
        }

        if self.alternatives > 10 {
            bail!(
                "--alternatives must be at most 10, got {}",
                self.alternatives
            );
        }

        if self.python_cmd.trim().is_empty() {
            bail!("--python-cmd cannot be empty");
        }

        Ok(())
    }
}
