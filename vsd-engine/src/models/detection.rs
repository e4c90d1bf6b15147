//! Detection data models
//!
//! Raw classifier output and the engine-side detection event derived from
//! it. The classifier reports labelled regions; the engine decides which of
//! them count by matching labels against a monitored-category allow-list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence threshold applied when a request does not override it
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Categories monitored when a session or job does not override them
///
/// Matching is by substring, so "cigarette" also covers "e-cigarette".
/// "cigarette" is listed before "cigar" so the more specific keyword wins.
pub fn default_categories() -> Vec<String> {
    ["cigarette", "cigar", "smoking", "vaping", "vape", "hookah"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Screen-space rectangle for a located capture target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Marker region meaning "the entire source frame"
    ///
    /// Used by capture sources that deliver whole frames and have no
    /// meaningful screen coordinates.
    pub fn full_frame() -> Self {
        Self::default()
    }
}

/// Frame bytes captured from a target
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Encoded image bytes as delivered by the capture source
    pub bytes: Vec<u8>,
    /// Artifact file extension hint, e.g. "png"
    pub extension: String,
}

impl CapturedFrame {
    pub fn new(bytes: Vec<u8>, extension: impl Into<String>) -> Self {
        Self {
            bytes,
            extension: extension.into(),
        }
    }
}

/// One labelled region reported by the classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    /// Classifier label, e.g. "cigarette", "vape-pen"
    pub label: String,
    /// Classifier confidence (0.0-1.0)
    pub confidence: f64,
    /// Bounding box `[x, y, width, height]` in frame pixels
    pub bbox: [i32; 4],
    /// Monitored category this detection matched, if any
    ///
    /// `None` until [`DetectionEvent::derive`] has run, and afterwards for
    /// labels outside the allow-list.
    pub category: Option<String>,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64, bbox: [i32; 4]) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
            category: None,
        }
    }
}

/// Raw classifier output for one frame
///
/// Detections below the requested confidence threshold are already gone;
/// dropping them is part of the classifier contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierOutput {
    pub detections: Vec<Detection>,
}

impl ClassifierOutput {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Detection event derived from one classified frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// When the source frame was captured
    pub captured_at: DateTime<Utc>,
    /// All detections from the frame, annotated with matched categories
    pub detections: Vec<Detection>,
}

impl DetectionEvent {
    /// Derive an event from raw classifier output
    ///
    /// A detection matches a category when its lowercased label contains
    /// the category keyword; the first matching category in the allow-list
    /// wins.
    pub fn derive(
        captured_at: DateTime<Utc>,
        output: ClassifierOutput,
        categories: &[String],
    ) -> Self {
        let detections = output
            .detections
            .into_iter()
            .map(|mut d| {
                d.category = match_category(&d.label, categories);
                d
            })
            .collect();
        Self {
            captured_at,
            detections,
        }
    }

    /// True when at least one detection matched a monitored category
    pub fn is_positive(&self) -> bool {
        self.detections.iter().any(|d| d.category.is_some())
    }

    /// Highest confidence among matched detections; 0.0 when none matched
    pub fn max_confidence(&self) -> f64 {
        self.detections
            .iter()
            .filter(|d| d.category.is_some())
            .map(|d| d.confidence)
            .fold(0.0, f64::max)
    }

    /// Category of the highest-confidence matched detection
    pub fn primary_category(&self) -> Option<&str> {
        self.detections
            .iter()
            .filter(|d| d.category.is_some())
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .and_then(|d| d.category.as_deref())
    }
}

fn match_category(label: &str, categories: &[String]) -> Option<String> {
    let label = label.to_lowercase();
    categories
        .iter()
        .find(|c| label.contains(&c.to_lowercase()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_from(labels: &[(&str, f64)]) -> DetectionEvent {
        let output = ClassifierOutput {
            detections: labels
                .iter()
                .map(|(l, c)| Detection::new(*l, *c, [0, 0, 10, 10]))
                .collect(),
        };
        DetectionEvent::derive(Utc::now(), output, &default_categories())
    }

    #[test]
    fn test_substring_matching_covers_compound_labels() {
        let event = event_from(&[("e-cigarette", 0.8)]);
        assert!(event.is_positive());
        assert_eq!(event.detections[0].category.as_deref(), Some("cigarette"));
    }

    #[test]
    fn test_cigarette_label_does_not_fall_through_to_cigar() {
        let event = event_from(&[("cigarette", 0.8)]);
        assert_eq!(event.detections[0].category.as_deref(), Some("cigarette"));

        let event = event_from(&[("cigar", 0.8)]);
        assert_eq!(event.detections[0].category.as_deref(), Some("cigar"));
    }

    #[test]
    fn test_unrelated_labels_do_not_match() {
        let event = event_from(&[("person", 0.99), ("bottle", 0.8)]);
        assert!(!event.is_positive());
        assert_eq!(event.max_confidence(), 0.0);
        assert_eq!(event.primary_category(), None);
    }

    #[test]
    fn test_max_confidence_only_counts_matched_detections() {
        // The unmatched "person" has the highest raw confidence.
        let event = event_from(&[("person", 0.99), ("vaping device", 0.7), ("cigarette", 0.6)]);
        assert!(event.is_positive());
        assert_eq!(event.max_confidence(), 0.7);
        assert_eq!(event.primary_category(), Some("vaping"));
    }

    #[test]
    fn test_empty_allow_list_never_matches() {
        let output = ClassifierOutput {
            detections: vec![Detection::new("cigarette", 0.9, [0, 0, 1, 1])],
        };
        let event = DetectionEvent::derive(Utc::now(), output, &[]);
        assert!(!event.is_positive());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let output = ClassifierOutput {
            detections: vec![Detection::new("Cigarette", 0.9, [0, 0, 1, 1])],
        };
        let categories = vec!["CIGARETTE".to_string()];
        let event = DetectionEvent::derive(Utc::now(), output, &categories);
        assert!(event.is_positive());
    }
}
