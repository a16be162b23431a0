//! Caption post-processing: normalize raw model output into a sentence the
//! display and speech paths can both use.

/// Fixed preamble spoken before the caption itself.
pub const SPEECH_PREFIX: &str = "This image shows: ";

/// Normalize a raw caption: trim, capitalize the first letter, and make sure
/// the sentence ends with a period. Empty input stays empty — we never
/// synthesize punctuation for a caption that does not exist. Idempotent.
pub fn format_caption(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut formatted: String = first.to_uppercase().collect();
    formatted.push_str(chars.as_str());
    if !formatted.ends_with('.') {
        formatted.push('.');
    }
    formatted
}

/// Render a formatted caption for the speech path, with the spoken preamble.
pub fn speech_rendering(formatted: &str) -> String {
    format!("{SPEECH_PREFIX}{formatted}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_caption_stays_empty() {
        assert_eq!(format_caption(""), "");
        assert_eq!(format_caption("   "), "");
    }

    #[test]
    fn capitalizes_and_terminates() {
        assert_eq!(format_caption("a red car"), "A red car.");
    }

    #[test]
    fn existing_period_is_kept_but_capitalization_still_applies() {
        assert_eq!(format_caption("a dog."), "A dog.");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(format_caption("  two cats on a bed \n"), "Two cats on a bed.");
    }

    #[test]
    fn formatting_is_a_fixed_point() {
        let once = format_caption("a crowded street market");
        let twice = format_caption(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn speech_rendering_adds_fixed_prefix() {
        assert_eq!(
            speech_rendering("A red car."),
            "This image shows: A red car."
        );
    }
}
