//! Detection deduplication
//!
//! One alert per cooldown window, across all categories. A burst of
//! detections collapses to the first one, and category B arriving during
//! category A's cooldown is suppressed too. The window is wall-clock time,
//! injected by the caller so the gate stays testable without sleeping.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::DetectionEvent;

/// Outcome of offering an event to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Positive event outside the cooldown window; alert now
    Promote,
    /// Inside the cooldown window; dropped regardless of content
    Suppress,
    /// No matched category, nothing to alert on
    NoMatch,
}

/// Per-session cooldown gate, owned by the session loop
pub struct CooldownGate {
    cooldown: Duration,
    last_alert: Option<DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert: None,
        }
    }

    /// Decide what to do with `event` observed at `now`
    ///
    /// Promotion is irreversible: once an event promotes, the window starts
    /// and nothing else can promote until it elapses.
    pub fn offer(&mut self, event: &DetectionEvent, now: DateTime<Utc>) -> GateDecision {
        if let Some(last) = self.last_alert {
            let since = now.signed_duration_since(last);
            // negative elapsed (clock moved backwards) counts as in-window
            let within = since.to_std().map_or(true, |d| d < self.cooldown);
            if within {
                return GateDecision::Suppress;
            }
        }

        if event.is_positive() {
            self.last_alert = Some(now);
            GateDecision::Promote
        } else {
            GateDecision::NoMatch
        }
    }

    pub fn last_alert(&self) -> Option<DateTime<Utc>> {
        self.last_alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_categories, ClassifierOutput, Detection, DetectionEvent};
    use chrono::TimeZone;

    fn event_with(label: &str, at: DateTime<Utc>) -> DetectionEvent {
        let output = ClassifierOutput {
            detections: vec![Detection::new(label, 0.9, [0, 0, 10, 10])],
        };
        DetectionEvent::derive(at, output, &default_categories())
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_756_100_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_cooldown_window_suppresses_repeats() {
        let mut gate = CooldownGate::new(Duration::from_secs(30));

        assert_eq!(gate.offer(&event_with("cigarette", t(0)), t(0)), GateDecision::Promote);
        assert_eq!(gate.offer(&event_with("cigarette", t(10)), t(10)), GateDecision::Suppress);
        assert_eq!(gate.offer(&event_with("cigarette", t(35)), t(35)), GateDecision::Promote);
    }

    #[test]
    fn test_cooldown_is_global_across_categories() {
        let mut gate = CooldownGate::new(Duration::from_secs(30));

        assert_eq!(gate.offer(&event_with("cigarette", t(0)), t(0)), GateDecision::Promote);
        assert_eq!(gate.offer(&event_with("vaping", t(10)), t(10)), GateDecision::Suppress);
        assert_eq!(gate.offer(&event_with("vaping", t(31)), t(31)), GateDecision::Promote);
    }

    #[test]
    fn test_negative_event_does_not_open_window() {
        let mut gate = CooldownGate::new(Duration::from_secs(30));

        assert_eq!(gate.offer(&event_with("chair", t(0)), t(0)), GateDecision::NoMatch);
        assert!(gate.last_alert().is_none());
        assert_eq!(gate.offer(&event_with("cigarette", t(1)), t(1)), GateDecision::Promote);
    }

    #[test]
    fn test_negative_event_inside_window_reports_suppress() {
        let mut gate = CooldownGate::new(Duration::from_secs(30));

        assert_eq!(gate.offer(&event_with("cigarette", t(0)), t(0)), GateDecision::Promote);
        assert_eq!(gate.offer(&event_with("chair", t(5)), t(5)), GateDecision::Suppress);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let mut gate = CooldownGate::new(Duration::from_secs(30));

        assert_eq!(gate.offer(&event_with("cigarette", t(0)), t(0)), GateDecision::Promote);
        assert_eq!(gate.offer(&event_with("cigarette", t(30)), t(30)), GateDecision::Promote);
    }
}
