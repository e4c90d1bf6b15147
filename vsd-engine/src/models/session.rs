//! Monitoring session data models
//!
//! A session owns its mutable state inside its worker task; the shared
//! pieces here are the immutable [`SessionConfig`] and the atomic
//! [`SessionStats`] counters that HTTP handlers read without locking.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::detection::{default_categories, DEFAULT_CONFIDENCE_THRESHOLD};

/// Seconds between capture ticks when the caller does not say otherwise
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Seconds during which repeat detections are suppressed after an alert
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;

/// Newest evidence artifacts kept per session
pub const DEFAULT_MAX_ARTIFACTS: usize = 5;

/// Monitoring session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_targets() -> Vec<String> {
    ["youtube", "tiktok", "instagram", "netflix"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Immutable per-session settings, fixed at start time
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Window title substrings the capture source looks for
    pub targets: Vec<String>,
    pub poll_interval: Duration,
    pub cooldown: Duration,
    pub max_artifacts: usize,
    /// Label allow-list for category matching
    pub categories: Vec<String>,
    pub confidence_threshold: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
            max_artifacts: DEFAULT_MAX_ARTIFACTS,
            categories: default_categories(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Lock-free counters shared between a session worker and HTTP readers
///
/// `last_alert_micros` holds the unix timestamp of the most recent alert
/// in microseconds, 0 meaning "never".
#[derive(Debug, Default)]
pub struct SessionStats {
    ticks: AtomicU64,
    frames_classified: AtomicU64,
    alerts_emitted: AtomicU64,
    last_alert_micros: AtomicI64,
}

impl SessionStats {
    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classified(&self) {
        self.frames_classified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert(&self, at: DateTime<Utc>) {
        self.alerts_emitted.fetch_add(1, Ordering::Relaxed);
        self.last_alert_micros
            .store(at.timestamp_micros(), Ordering::Relaxed);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn frames_classified(&self) -> u64 {
        self.frames_classified.load(Ordering::Relaxed)
    }

    pub fn alerts_emitted(&self) -> u64 {
        self.alerts_emitted.load(Ordering::Relaxed)
    }

    pub fn last_alert_at(&self) -> Option<DateTime<Utc>> {
        let micros = self.last_alert_micros.load(Ordering::Relaxed);
        if micros == 0 {
            return None;
        }
        Utc.timestamp_micros(micros).single()
    }
}

/// Point-in-time view of a session, served by the status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub state: SessionState,
    pub targets: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub ticks: u64,
    pub frames_classified: u64,
    pub alerts_emitted: u64,
    pub last_alert_at: Option<DateTime<Utc>>,
}
