//! Interactive narration session: one image at a time, commands typed or
//! spoken, every result rendered as text and (when possible) audio.
//!
//! Typed free text goes through the same intent parser as voice transcripts,
//! so "describe" at the prompt behaves exactly like saying it.

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::analysis::{run_analysis, AnalysisReport};
use crate::config::AppConfig;
use crate::engines::Engines;
use crate::image::ImageInput;
use crate::log_debug;
use crate::voice::{self, command_help, parse_action, VoiceAction, VoiceControl};

const PROMPT: &str = "narrator> ";

/// Session state: the current image, the last report, and the voice cycle.
pub struct Session<'a> {
    config: &'a AppConfig,
    engines: &'a Engines,
    voice: VoiceControl,
    image: Option<ImageInput>,
    last_report: Option<AnalysisReport>,
    audio_playing: bool,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a AppConfig, engines: &'a Engines) -> Self {
        Self {
            config,
            engines,
            voice: VoiceControl::new(),
            image: None,
            last_report: None,
            audio_playing: false,
        }
    }

    /// Load an image and immediately analyze it, matching the auto-analyze
    /// behavior on a fresh upload.
    pub fn load_image(&mut self, image: ImageInput, out: &mut impl Write) -> Result<()> {
        writeln!(out, "Image loaded: {}", image.path().display())?;
        self.image = Some(image);
        writeln!(out, "Auto-analyzing image...")?;
        self.analyze(out)
    }

    /// Run the line-driven loop until quit/EOF.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> Result<()> {
        for error in &self.engines.load_errors {
            writeln!(out, "Warning: {error}")?;
        }
        writeln!(
            out,
            "Type a command (\"describe\", \"play\", \"help\"), \"image <path>\" to load \
             an image, \"voice\" to speak a command, or \"quit\" to exit."
        )?;

        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if matches!(trimmed.to_lowercase().as_str(), "quit" | "exit" | "q") {
                break;
            }
            self.handle_line(trimmed, &mut out)?;
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> Result<()> {
        if let Some(path) = line.strip_prefix("image ") {
            match ImageInput::open(path.trim().as_ref()) {
                Ok(image) => self.load_image(image, out)?,
                Err(err) => writeln!(out, "Failed to load image: {err:#}")?,
            }
            return Ok(());
        }

        if matches!(line.to_lowercase().as_str(), "voice" | "v") {
            self.voice_command(out)?;
            return Ok(());
        }

        match parse_action(line) {
            Some(action) => self.dispatch(action, out)?,
            None => writeln!(
                out,
                "Command not recognized. Type \"help\" for available commands."
            )?,
        }
        Ok(())
    }

    /// One full voice cycle: listen, parse, post to the mailbox, consume once.
    fn voice_command(&mut self, out: &mut impl Write) -> Result<()> {
        let Some(transcriber) = &self.engines.transcriber else {
            writeln!(out, "Voice commands are unavailable this session.")?;
            return Ok(());
        };

        writeln!(out, "Listening...")?;
        out.flush()?;
        self.voice.begin_listening();

        let command = voice::listen_for_command(transcriber.as_ref(), self.config.listen_timeout());
        match &command {
            Some(heard) => writeln!(out, "Heard: \"{heard}\"")?,
            None => writeln!(out, "No command detected. Please try again.")?,
        }
        let action = command.as_deref().and_then(parse_action);
        if command.is_some() && action.is_none() {
            writeln!(
                out,
                "Command not recognized. Say \"help\" for available commands."
            )?;
        }
        self.voice.on_transcription(action);

        // Exactly-once delivery: the mailbox clears as we read it.
        if let Some(action) = self.voice.consume() {
            self.dispatch(action, out)?;
            self.voice.reset();
        }
        Ok(())
    }

    fn dispatch(&mut self, action: VoiceAction, out: &mut impl Write) -> Result<()> {
        log_debug(&format!("dispatching action: {}", action.label()));
        match action {
            VoiceAction::Analyze => self.analyze(out),
            VoiceAction::Play => self.play(out),
            VoiceAction::Stop => self.stop(out),
            VoiceAction::Upload => {
                writeln!(out, "Type \"image <path>\" to switch to a different image.")?;
                Ok(())
            }
            VoiceAction::Help => {
                writeln!(out, "{}", command_help())?;
                Ok(())
            }
        }
    }

    fn analyze(&mut self, out: &mut impl Write) -> Result<()> {
        let Some(image) = &self.image else {
            writeln!(out, "No image loaded. Type \"image <path>\" first.")?;
            return Ok(());
        };

        writeln!(out, "Analyzing image...")?;
        out.flush()?;
        let report = run_analysis(self.engines, self.config, image);
        self.render_report(&report, out)?;
        if report.audio.is_some() && self.config.auto_play() {
            self.audio_playing = true;
        }
        self.last_report = Some(report);
        Ok(())
    }

    fn render_report(&self, report: &AnalysisReport, out: &mut impl Write) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "Description ({}):", report.detail_level.label())?;
        writeln!(out, "  {}", report.display_caption())?;

        if let Some(ocr_section) = report.display_ocr() {
            writeln!(out, "Text found in image:")?;
            writeln!(out, "  {ocr_section}")?;
        }

        match &report.audio {
            Some(path) => {
                writeln!(out, "Audio description: {}", path.display())?;
                writeln!(out, "  Playing at {}", self.config.playback_speed)?;
            }
            None => writeln!(
                out,
                "Could not generate audio, but you can still read the description above."
            )?,
        }
        writeln!(out)?;
        Ok(())
    }

    fn play(&mut self, out: &mut impl Write) -> Result<()> {
        match self.last_report.as_ref().and_then(|r| r.audio.as_ref()) {
            Some(path) => {
                self.audio_playing = true;
                writeln!(
                    out,
                    "Playing {} at {}",
                    path.display(),
                    self.config.playback_speed
                )?;
            }
            None => writeln!(out, "No audio description available yet. Analyze an image first.")?,
        }
        Ok(())
    }

    fn stop(&mut self, out: &mut impl Write) -> Result<()> {
        if self.audio_playing {
            self.audio_playing = false;
            writeln!(out, "Playback stopped.")?;
        } else {
            writeln!(out, "Nothing is playing.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;

    fn test_config(args: &[&str]) -> AppConfig {
        let mut full = vec!["narrator-test"];
        full.extend_from_slice(args);
        let mut config = AppConfig::parse_from(full);
        config.validate().unwrap();
        config
    }

    fn run_session(config: &AppConfig, engines: &Engines, script: &str) -> String {
        let mut out = Vec::new();
        let mut session = Session::new(config, engines);
        session
            .run(Cursor::new(script.to_string()), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn help_command_lists_voice_commands() {
        let config = test_config(&[]);
        let output = run_session(&config, &Engines::disabled(), "help\nquit\n");
        assert!(output.contains("Voice commands:"));
    }

    #[test]
    fn unknown_command_prompts_for_help() {
        let config = test_config(&[]);
        let output = run_session(&config, &Engines::disabled(), "banana\n");
        assert!(output.contains("Command not recognized"));
    }

    #[test]
    fn analyze_without_image_asks_for_one() {
        let config = test_config(&[]);
        let output = run_session(&config, &Engines::disabled(), "describe\n");
        assert!(output.contains("No image loaded"));
    }

    #[test]
    fn play_before_analysis_warns() {
        let config = test_config(&[]);
        let output = run_session(&config, &Engines::disabled(), "play\nstop\n");
        assert!(output.contains("No audio description available yet"));
        assert!(output.contains("Nothing is playing."));
    }

    #[test]
    fn voice_without_transcriber_is_reported() {
        let config = test_config(&["--voice"]);
        let output = run_session(&config, &Engines::disabled(), "voice\n");
        assert!(output.contains("Voice commands are unavailable"));
    }

    #[test]
    fn load_errors_are_shown_once_at_startup() {
        let config = test_config(&[]);
        let mut engines = Engines::disabled();
        engines
            .load_errors
            .push("captioning unavailable: helper script not found".to_string());
        let output = run_session(&config, &engines, "quit\n");
        assert!(output.contains("Warning: captioning unavailable"));
    }

    #[test]
    fn bad_image_path_is_a_soft_failure() {
        let config = test_config(&[]);
        let output = run_session(
            &config,
            &Engines::disabled(),
            "image /nonexistent/photo.png\nquit\n",
        );
        assert!(output.contains("Failed to load image"));
    }
}
