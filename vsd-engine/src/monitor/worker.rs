//! Monitoring session capture loop

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dedup::{CooldownGate, GateDecision};
use crate::capture::CaptureSource;
use crate::classify::FrameClassifier;
use crate::db;
use crate::evidence::EvidenceStore;
use crate::models::{
    CaptureRegion, CapturedFrame, DetectionEvent, SessionConfig, SessionStats,
};
use vsd_common::{Alert, AlertHub, Result};

/// One monitoring session's capture loop
///
/// Owns all mutable session state (the cooldown gate). Shared observers see
/// only the atomic counters in [`SessionStats`]. The loop exits when its
/// cancellation token fires; every per-tick failure is logged and skipped.
pub struct SessionWorker {
    session_id: Uuid,
    config: SessionConfig,
    classifier: Arc<dyn FrameClassifier>,
    capture: Arc<dyn CaptureSource>,
    evidence: Arc<EvidenceStore>,
    hub: AlertHub,
    pool: SqlitePool,
    stats: Arc<SessionStats>,
    cancel: CancellationToken,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: Uuid,
        config: SessionConfig,
        classifier: Arc<dyn FrameClassifier>,
        capture: Arc<dyn CaptureSource>,
        evidence: Arc<EvidenceStore>,
        hub: AlertHub,
        pool: SqlitePool,
        stats: Arc<SessionStats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session_id,
            config,
            classifier,
            capture,
            evidence,
            hub,
            pool,
            stats,
            cancel,
        }
    }

    pub async fn run(self) {
        let mut gate = CooldownGate::new(self.config.cooldown);
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            session_id = %self.session_id,
            targets = ?self.config.targets,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Monitoring session loop started"
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {
                    self.stats.record_tick();
                    if let Err(e) = self.tick(&mut gate).await {
                        warn!(session_id = %self.session_id, "Tick failed: {}", e);
                    }
                }
            }
        }

        info!(session_id = %self.session_id, "Monitoring session loop exited");
    }

    /// One capture tick: resolve, capture, classify, gate, promote
    async fn tick(&self, gate: &mut CooldownGate) -> Result<()> {
        let Some((target, region)) = self.locate_target().await else {
            debug!(session_id = %self.session_id, "No monitored target visible");
            return Ok(());
        };

        let frame = self.capture.capture(&target, &region).await?;
        let output = self
            .classifier
            .classify(&frame, self.config.confidence_threshold)
            .await?;
        self.stats.record_classified();

        let now = Utc::now();
        let event = DetectionEvent::derive(now, output, &self.config.categories);

        match gate.offer(&event, now) {
            GateDecision::Promote => self.promote(&target, &frame, &event).await,
            GateDecision::Suppress => {
                debug!(session_id = %self.session_id, "Detection suppressed by cooldown");
                Ok(())
            }
            GateDecision::NoMatch => Ok(()),
        }
    }

    /// First visible target from the session's allow-list
    async fn locate_target(&self) -> Option<(String, CaptureRegion)> {
        for target in &self.config.targets {
            if let Some(region) = self.capture.locate(target).await {
                return Some((target.clone(), region));
            }
        }
        None
    }

    /// Record evidence, persist the detection, publish the alert
    ///
    /// Evidence and persistence failures are logged but never block the
    /// alert itself.
    async fn promote(&self, target: &str, frame: &CapturedFrame, event: &DetectionEvent) -> Result<()> {
        let category = event.primary_category().unwrap_or("unknown").to_string();
        let max_confidence = event.max_confidence();

        let screenshot_path = match self.evidence.record(
            self.session_id,
            frame,
            self.config.max_artifacts,
        ) {
            Ok(path) => Some(path.to_string_lossy().to_string()),
            Err(e) => {
                warn!(session_id = %self.session_id, "Failed to record evidence: {}", e);
                None
            }
        };

        if let Err(e) = db::detections::insert_detection(
            &self.pool,
            self.session_id,
            &category,
            max_confidence,
            &event.detections,
            screenshot_path.as_deref(),
            event.captured_at,
        )
        .await
        {
            warn!(session_id = %self.session_id, "Failed to persist detection: {}", e);
        }

        info!(
            session_id = %self.session_id,
            target = target,
            category = %category,
            confidence = max_confidence,
            "Detection promoted"
        );

        self.hub.publish(Alert {
            session_id: self.session_id.to_string(),
            category,
            max_confidence,
            timestamp: event.captured_at,
            screenshot_path,
        });
        self.stats.record_alert(event.captured_at);

        Ok(())
    }
}
