//! OCR result handling: confidence filtering and the human-readable rendering
//! used for display and speech. Engine failures degrade to "no text detected".

use std::path::Path;

use serde::Deserialize;

use crate::engines::OcrEngine;
use crate::log_debug;

/// One detected text region, as reported by the OCR engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OcrSpan {
    pub text: String,
    pub confidence: f32,
    /// Axis-aligned bounding box: x, y, width, height in pixels.
    #[serde(default)]
    pub bbox: [f32; 4],
}

/// Confidence-filtered OCR output for one analysis request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    spans: Vec<OcrSpan>,
    /// Set when the engine failed and the output is an empty placeholder.
    pub degraded: bool,
}

impl OcrOutput {
    /// Build an output from raw engine spans, dropping everything below the
    /// confidence threshold. Dropped spans are gone, not flagged.
    pub fn from_spans(spans: Vec<OcrSpan>, confidence_threshold: f32) -> Self {
        let spans = spans
            .into_iter()
            .filter(|span| span.confidence >= confidence_threshold)
            .collect();
        Self {
            spans,
            degraded: false,
        }
    }

    /// Empty output standing in for a failed extraction.
    pub fn degraded() -> Self {
        Self {
            spans: Vec::new(),
            degraded: true,
        }
    }

    pub fn count(&self) -> usize {
        self.spans.len()
    }

    pub fn has_text(&self) -> bool {
        !self.spans.is_empty()
    }

    pub fn spans(&self) -> &[OcrSpan] {
        &self.spans
    }

    /// All retained text joined in reading order.
    pub fn combined_text(&self) -> String {
        self.spans
            .iter()
            .map(|span| span.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Sentence used for both the on-screen OCR section and the spoken summary.
    pub fn speech_summary(&self) -> String {
        match self.count() {
            0 => "No text detected in the image.".to_string(),
            1 => format!("Found 1 text element: {}", self.combined_text()),
            n => format!("Found {n} text elements: {}", self.combined_text()),
        }
    }
}

/// Run OCR on an image, never letting an engine failure cross this boundary.
pub fn extract_text(engine: &dyn OcrEngine, image: &Path, confidence_threshold: f32) -> OcrOutput {
    match engine.extract(image, confidence_threshold) {
        Ok(spans) => OcrOutput::from_spans(spans, confidence_threshold),
        Err(err) => {
            log_debug(&format!("ocr extraction failed, degrading: {err:#}"));
            OcrOutput::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn span(text: &str, confidence: f32) -> OcrSpan {
        OcrSpan {
            text: text.to_string(),
            confidence,
            bbox: [0.0, 0.0, 10.0, 10.0],
        }
    }

    #[test]
    fn spans_below_threshold_are_dropped_entirely() {
        let output = OcrOutput::from_spans(
            vec![span("EXIT", 0.9), span("smudge", 0.1), span("Main St", 0.5)],
            0.3,
        );
        assert_eq!(output.count(), 2);
        assert!(output.spans().iter().all(|s| s.confidence >= 0.3));
    }

    #[test]
    fn count_always_matches_retained_spans() {
        let output = OcrOutput::from_spans(vec![span("a", 0.4), span("b", 0.8)], 0.3);
        assert_eq!(output.count(), output.spans().len());
    }

    #[test]
    fn has_text_iff_count_positive() {
        let empty = OcrOutput::from_spans(vec![span("noise", 0.05)], 0.3);
        assert!(!empty.has_text());
        let nonempty = OcrOutput::from_spans(vec![span("STOP", 0.95)], 0.3);
        assert!(nonempty.has_text());
    }

    #[test]
    fn summary_wording_tracks_element_count() {
        let none = OcrOutput::from_spans(vec![], 0.3);
        assert_eq!(none.speech_summary(), "No text detected in the image.");

        let one = OcrOutput::from_spans(vec![span("EXIT", 0.9)], 0.3);
        assert_eq!(one.speech_summary(), "Found 1 text element: EXIT");

        let two = OcrOutput::from_spans(vec![span("Main", 0.9), span("Street", 0.8)], 0.3);
        assert_eq!(two.speech_summary(), "Found 2 text elements: Main Street");
    }

    struct FailingEngine;
    impl OcrEngine for FailingEngine {
        fn extract(&self, _image: &Path, _threshold: f32) -> anyhow::Result<Vec<OcrSpan>> {
            Err(anyhow!("reader crashed"))
        }
    }

    struct FixedEngine(Vec<OcrSpan>);
    impl OcrEngine for FixedEngine {
        fn extract(&self, _image: &Path, _threshold: f32) -> anyhow::Result<Vec<OcrSpan>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn engine_failure_degrades_to_empty_output() {
        let output = extract_text(&FailingEngine, Path::new("img.png"), 0.3);
        assert!(output.degraded);
        assert_eq!(output.count(), 0);
        assert_eq!(output.speech_summary(), "No text detected in the image.");
    }

    #[test]
    fn extraction_filters_even_if_engine_ignores_threshold() {
        let engine = FixedEngine(vec![span("kept", 0.7), span("dropped", 0.1)]);
        let output = extract_text(&engine, Path::new("img.png"), 0.3);
        assert_eq!(output.count(), 1);
        assert_eq!(output.combined_text(), "kept");
    }
}
