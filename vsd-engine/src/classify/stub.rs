//! Deterministic classifier stand-in

use async_trait::async_trait;
use tracing::debug;

use super::FrameClassifier;
use crate::models::{CapturedFrame, ClassifierOutput, Detection};
use vsd_common::Result;

/// Classifier that returns a fixed set of detections for every frame
///
/// This is the default wiring when no inference endpoint is configured: the
/// engine runs end to end but reports nothing. Tests construct it with
/// canned detections to drive the pipeline deterministically.
#[derive(Debug, Clone, Default)]
pub struct StubClassifier {
    output: ClassifierOutput,
}

impl StubClassifier {
    /// Stub that never detects anything
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub that returns the given detections for every frame
    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self {
            output: ClassifierOutput { detections },
        }
    }

    /// Stub that reports a single detection with the given label
    pub fn detecting(label: &str, confidence: f64) -> Self {
        Self::with_detections(vec![Detection::new(label, confidence, [0, 0, 64, 64])])
    }
}

#[async_trait]
impl FrameClassifier for StubClassifier {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn classify(
        &self,
        frame: &CapturedFrame,
        confidence_threshold: f32,
    ) -> Result<ClassifierOutput> {
        debug!(
            frame_bytes = frame.bytes.len(),
            detections = self.output.detections.len(),
            "stub classify"
        );
        let mut output = self.output.clone();
        output
            .detections
            .retain(|d| d.confidence >= f64::from(confidence_threshold));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_stub_detects_nothing() {
        let classifier = StubClassifier::new();
        let frame = CapturedFrame::new(vec![0u8; 16], "png");
        let output = classifier.classify(&frame, 0.5).await.unwrap();
        assert!(output.detections.is_empty());
    }

    #[tokio::test]
    async fn test_fixed_output_returned_for_every_frame() {
        let classifier = StubClassifier::detecting("cigarette", 0.9);
        for _ in 0..3 {
            let frame = CapturedFrame::new(vec![1u8; 16], "jpg");
            let output = classifier.classify(&frame, 0.5).await.unwrap();
            assert_eq!(output.detections.len(), 1);
            assert_eq!(output.detections[0].label, "cigarette");
        }
    }

    #[tokio::test]
    async fn test_threshold_filters_low_confidence() {
        let classifier = StubClassifier::with_detections(vec![
            Detection::new("cigarette", 0.9, [0, 0, 10, 10]),
            Detection::new("vape", 0.3, [0, 0, 10, 10]),
        ]);
        let frame = CapturedFrame::new(vec![0u8; 16], "png");
        let output = classifier.classify(&frame, 0.5).await.unwrap();
        assert_eq!(output.detections.len(), 1);
        assert_eq!(output.detections[0].label, "cigarette");
    }
}
