//! Voice intent parsing: map one transcribed utterance to an app action.
//!
//! Pure substring matching against fixed keyword sets, checked in priority
//! order so "analyze and play it" resolves to analyze.

/// App action derived from a spoken command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoiceAction {
    Analyze,
    Play,
    Stop,
    Upload,
    Help,
}

impl VoiceAction {
    pub fn label(self) -> &'static str {
        match self {
            VoiceAction::Analyze => "analyze",
            VoiceAction::Play => "play",
            VoiceAction::Stop => "stop",
            VoiceAction::Upload => "upload",
            VoiceAction::Help => "help",
        }
    }
}

// Keyword categories in priority order; first category with a hit wins.
const CATEGORIES: &[(VoiceAction, &[&str])] = &[
    (
        VoiceAction::Analyze,
        &["analyze", "analyse", "describe", "caption", "what is this", "tell me"],
    ),
    (VoiceAction::Play, &["play", "listen", "hear", "audio"]),
    (VoiceAction::Stop, &["stop", "pause", "quiet"]),
    (
        VoiceAction::Upload,
        &["upload", "new image", "different image"],
    ),
    (
        VoiceAction::Help,
        &["help", "commands", "what can you do"],
    ),
];

/// Parse a transcribed utterance into an action. Lowercases and trims before
/// matching; empty input yields no action without any pattern work.
pub fn parse_action(utterance: &str) -> Option<VoiceAction> {
    let normalized = utterance.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    for (action, keywords) in CATEGORIES {
        if keywords.iter().any(|keyword| normalized.contains(keyword)) {
            return Some(*action);
        }
    }
    None
}

/// Spoken-command help shown by the session and narrated on request.
pub fn command_help() -> &'static str {
    "Voice commands:\n\
     - \"analyze\" or \"describe\": describe the current image\n\
     - \"play\" or \"listen\": play the audio description\n\
     - \"stop\" or \"pause\": stop audio playback\n\
     - \"upload\" or \"new image\": switch to a different image\n\
     - \"help\": list available commands"
}
