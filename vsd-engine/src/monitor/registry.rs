//! Live monitoring session registry
//!
//! One worker task per session, keyed by session id. The registry owns the
//! handles needed to observe and stop workers; all loop state stays inside
//! the workers themselves.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::worker::SessionWorker;
use crate::capture::CaptureSource;
use crate::classify::FrameClassifier;
use crate::evidence::EvidenceStore;
use crate::models::{SessionConfig, SessionSnapshot, SessionState, SessionStats};
use vsd_common::{AlertHub, Error, Result};

/// How long stop waits for a loop to exit before abandoning it
pub const STOP_GRACE: Duration = Duration::from_secs(2);

struct SessionHandle {
    state: SessionState,
    targets: Vec<String>,
    started_at: DateTime<Utc>,
    stats: Arc<SessionStats>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    fn snapshot(&self, session_id: Uuid) -> SessionSnapshot {
        SessionSnapshot {
            session_id,
            state: self.state,
            targets: self.targets.clone(),
            started_at: self.started_at,
            ticks: self.stats.ticks(),
            frames_classified: self.stats.frames_classified(),
            alerts_emitted: self.stats.alerts_emitted(),
            last_alert_at: self.stats.last_alert_at(),
        }
    }
}

pub struct MonitorRegistry {
    sessions: Mutex<HashMap<Uuid, SessionHandle>>,
    classifier: Arc<dyn FrameClassifier>,
    capture: Arc<dyn CaptureSource>,
    evidence: Arc<EvidenceStore>,
    hub: AlertHub,
    pool: SqlitePool,
}

impl MonitorRegistry {
    pub fn new(
        classifier: Arc<dyn FrameClassifier>,
        capture: Arc<dyn CaptureSource>,
        evidence: Arc<EvidenceStore>,
        hub: AlertHub,
        pool: SqlitePool,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            classifier,
            capture,
            evidence,
            hub,
            pool,
        }
    }

    /// Start a monitoring session, or return the running one untouched
    ///
    /// A stopped session restarts fresh under the same id: new loop, new
    /// counters, new cooldown window.
    pub async fn start(&self, session_id: Uuid, config: SessionConfig) -> Result<SessionSnapshot> {
        let mut sessions = self.sessions.lock().await;

        if let Some(existing) = sessions.get(&session_id) {
            if existing.state == SessionState::Running {
                debug!(session_id = %session_id, "Start for already-running session (no-op)");
                return Ok(existing.snapshot(session_id));
            }
        }

        let stats = Arc::new(SessionStats::default());
        let cancel = CancellationToken::new();
        let worker = SessionWorker::new(
            session_id,
            config.clone(),
            self.classifier.clone(),
            self.capture.clone(),
            self.evidence.clone(),
            self.hub.clone(),
            self.pool.clone(),
            stats.clone(),
            cancel.clone(),
        );
        let task = tokio::spawn(worker.run());

        let handle = SessionHandle {
            state: SessionState::Running,
            targets: config.targets,
            started_at: Utc::now(),
            stats,
            cancel,
            task: Some(task),
        };
        let snapshot = handle.snapshot(session_id);
        sessions.insert(session_id, handle);

        info!(session_id = %session_id, "Monitoring session started");
        Ok(snapshot)
    }

    /// Stop a session: cancel its loop, wait a bounded grace, mark Stopped
    ///
    /// Idempotent. Stopping an unknown or already-stopped session succeeds.
    /// Once this returns, a status query never reports the session Running.
    pub async fn stop(&self, session_id: Uuid) -> Result<()> {
        let (cancel, task) = {
            let mut sessions = self.sessions.lock().await;
            let Some(handle) = sessions.get_mut(&session_id) else {
                debug!(session_id = %session_id, "Stop for unknown session (no-op)");
                return Ok(());
            };
            if handle.state == SessionState::Stopped {
                return Ok(());
            }
            (handle.cancel.clone(), handle.task.take())
        };

        cancel.cancel();

        if let Some(mut task) = task {
            if tokio::time::timeout(STOP_GRACE, &mut task).await.is_err() {
                warn!(
                    session_id = %session_id,
                    "Session loop did not exit within grace period, aborting"
                );
                task.abort();
            }
        }

        let mut sessions = self.sessions.lock().await;
        if let Some(handle) = sessions.get_mut(&session_id) {
            handle.state = SessionState::Stopped;
        }

        info!(session_id = %session_id, "Monitoring session stopped");
        Ok(())
    }

    /// Point-in-time view of one session
    pub async fn status(&self, session_id: Uuid) -> Result<SessionSnapshot> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&session_id)
            .map(|handle| handle.snapshot(session_id))
            .ok_or_else(|| Error::NotFound(format!("session {} not found", session_id)))
    }

    /// Stop every session; used during shutdown
    pub async fn stop_all(&self) {
        let ids: Vec<Uuid> = {
            let sessions = self.sessions.lock().await;
            sessions.keys().copied().collect()
        };
        for session_id in ids {
            if let Err(e) = self.stop(session_id).await {
                warn!(session_id = %session_id, "Failed to stop session: {}", e);
            }
        }
    }
}
