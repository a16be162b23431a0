//! Voice command flow: capture a short utterance, sanitize the transcript,
//! and parse it into an app action. Capture failures never escalate; they
//! read as "nothing was said".

mod intent;
mod mailbox;

pub use intent::{command_help, parse_action, VoiceAction};
pub use mailbox::{ActionMailbox, ListenState, VoiceControl};

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::engines::SpeechTranscriber;
use crate::log_debug;

/// Capture one utterance and return the sanitized transcript, or `None` when
/// nothing usable was heard (timeout, recognition failure, pure noise).
pub fn listen_for_command(
    transcriber: &dyn SpeechTranscriber,
    timeout: Duration,
) -> Option<String> {
    let transcript = match transcriber.listen(timeout) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(err) => {
            log_debug(&format!("voice capture failed, treating as silence: {err:#}"));
            return None;
        }
    };
    let cleaned = sanitize_transcript(&transcript);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Capture, sanitize, and parse in one step.
pub fn listen_for_action(
    transcriber: &dyn SpeechTranscriber,
    timeout: Duration,
) -> Option<VoiceAction> {
    listen_for_command(transcriber, timeout).and_then(|command| parse_action(&command))
}

/// Strip recognizer noise markers and collapse whitespace so the intent
/// parser only sees actual speech.
pub fn sanitize_transcript(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    static NON_SPEECH_RE: OnceLock<Regex> = OnceLock::new();
    let re = NON_SPEECH_RE.get_or_init(|| {
        Regex::new(
            r"(?i)\[\s*\]|\(\s*\)|\[(?:\s*(?:silence|noise|inaudible|blank_audio|blank audio|music|laughter|applause|cough|breath(?:ing)?|background)\s*)\]|\((?:\s*(?:silence|noise|inaudible|blank audio|music|laughter|applause|cough|breath(?:ing)?|background)\s*)\)",
        )
        .expect("non-speech regex should compile")
    });
    let without_markers = re.replace_all(trimmed, " ");
    without_markers
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn sanitizer_strips_non_speech_markers() {
        assert_eq!(sanitize_transcript("[silence] analyze [noise] this"), "analyze this");
        assert_eq!(sanitize_transcript("(inaudible)"), "");
        assert_eq!(sanitize_transcript("  play   it  "), "play it");
    }

    struct FixedTranscriber(anyhow::Result<Option<String>>);
    impl SpeechTranscriber for FixedTranscriber {
        fn listen(&self, _timeout: Duration) -> anyhow::Result<Option<String>> {
            match &self.0 {
                Ok(value) => Ok(value.clone()),
                Err(err) => Err(anyhow!("{err}")),
            }
        }
    }

    #[test]
    fn timeout_yields_no_command() {
        let transcriber = FixedTranscriber(Ok(None));
        assert_eq!(listen_for_command(&transcriber, Duration::from_secs(3)), None);
    }

    #[test]
    fn capture_error_is_treated_as_silence() {
        let transcriber = FixedTranscriber(Err(anyhow!("microphone unavailable")));
        assert_eq!(listen_for_command(&transcriber, Duration::from_secs(3)), None);
    }

    #[test]
    fn noise_only_transcript_yields_no_command() {
        let transcriber = FixedTranscriber(Ok(Some("[BLANK_AUDIO]".to_string())));
        assert_eq!(listen_for_command(&transcriber, Duration::from_secs(3)), None);
    }

    #[test]
    fn listen_for_action_parses_the_cleaned_transcript() {
        let transcriber = FixedTranscriber(Ok(Some("[noise] Describe this photo".to_string())));
        assert_eq!(
            listen_for_action(&transcriber, Duration::from_secs(3)),
            Some(VoiceAction::Analyze)
        );
    }
}
