//! Alert types for the VSD alert pipeline
//!
//! Provides the internal `Alert` record produced by monitoring sessions and
//! the wire message delivered to subscribers. Alerts are transient: they are
//! pushed through the [`crate::hub::AlertHub`] and never persisted by the
//! hub itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::unix_seconds;

/// Human-readable label attached to every detection alert
pub const ALERT_LABEL: &str = "Vaping and Smoking Detection";

/// Alert produced when a monitoring session promotes a detection
///
/// Carries the session id for logging and persistence side effects; the
/// subscriber-facing wire message drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Session that produced the alert
    pub session_id: String,
    /// Primary matched category (e.g. "smoking", "vaping")
    pub category: String,
    /// Highest confidence among matched detections (0.0-1.0)
    pub max_confidence: f64,
    /// When the detection was promoted
    pub timestamp: DateTime<Utc>,
    /// Retained evidence artifact, if one was recorded
    pub screenshot_path: Option<String>,
}

impl Alert {
    /// Convert to the subscriber-facing wire message
    pub fn to_message(&self) -> AlertMessage {
        AlertMessage {
            kind: "detection".to_string(),
            label: ALERT_LABEL.to_string(),
            detection_type: self.category.clone(),
            max_confidence: self.max_confidence,
            timestamp: unix_seconds(self.timestamp),
            screenshot_path: self.screenshot_path.clone(),
        }
    }
}

/// Wire format delivered to alert subscribers
///
/// Field names and types are a published contract; clients parse this shape
/// directly. `timestamp` is Unix seconds as a float.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertMessage {
    /// Message kind discriminator, always "detection"
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable alert label
    pub label: String,
    /// Matched detection category
    pub detection_type: String,
    /// Highest matched confidence (0.0-1.0)
    pub max_confidence: f64,
    /// Unix seconds, fractional
    pub timestamp: f64,
    /// Evidence artifact path, if retained
    pub screenshot_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alert() -> Alert {
        Alert {
            session_id: "device-001".to_string(),
            category: "smoking".to_string(),
            max_confidence: 0.87,
            timestamp: chrono::Utc::now(),
            screenshot_path: Some("/tmp/evidence/device-001/cap.png".to_string()),
        }
    }

    #[test]
    fn test_wire_message_field_names() {
        let mut alert = sample_alert();
        alert.screenshot_path = None;

        let json = serde_json::to_value(alert.to_message()).unwrap();

        // Exact wire contract: clients match on these names.
        assert_eq!(json["type"], "detection");
        assert_eq!(json["label"], ALERT_LABEL);
        assert_eq!(json["detection_type"], "smoking");
        assert_eq!(json["max_confidence"], 0.87);
        assert!(json["timestamp"].is_f64());
        assert!(json["screenshot_path"].is_null());
    }

    #[test]
    fn test_wire_message_carries_evidence_path() {
        let msg = sample_alert().to_message();
        assert_eq!(
            msg.screenshot_path.as_deref(),
            Some("/tmp/evidence/device-001/cap.png")
        );
    }

    #[test]
    fn test_wire_message_round_trip() {
        let msg = sample_alert().to_message();
        let json = serde_json::to_string(&msg).unwrap();
        let back: AlertMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_timestamp_is_unix_seconds() {
        let msg = sample_alert().to_message();
        // Sanity bound: after 2020, before 2100.
        assert!(msg.timestamp > 1_577_836_800.0);
        assert!(msg.timestamp < 4_102_444_800.0);
    }
}
