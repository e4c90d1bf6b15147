//! Evidence artifact store
//!
//! Promoted detections keep a screenshot on disk. Artifacts live under
//! `<root>/<session_id>/`; after every write the store prunes the directory
//! down to the newest `max_retained` artifacts so disk use stays bounded no
//! matter how long a session runs.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::CapturedFrame;
use vsd_common::{Error, Result};

pub struct EvidenceStore {
    root: PathBuf,
    seq: AtomicU64,
}

impl EvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn session_dir(&self, session_id: Uuid) -> PathBuf {
        self.root.join(session_id.to_string())
    }

    /// Write one artifact and enforce the retention bound
    ///
    /// Returns the artifact path. Pruning never fails the call: deletion
    /// errors are logged and skipped.
    pub fn record(
        &self,
        session_id: Uuid,
        frame: &CapturedFrame,
        max_retained: usize,
    ) -> Result<PathBuf> {
        let dir = self.session_dir(session_id);
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Internal(format!(
                "failed to create evidence dir {}: {}",
                dir.display(),
                e
            ))
        })?;

        // Zero-padded stamp plus a process-local sequence number keeps
        // lexicographic filename order equal to creation order.
        let micros = chrono::Utc::now().timestamp_micros().max(0) as u64;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("{:020}_{:06}.{}", micros, seq, frame.extension));

        std::fs::write(&path, &frame.bytes).map_err(|e| {
            Error::Internal(format!(
                "failed to write artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        debug!(session_id = %session_id, path = %path.display(), "Evidence artifact recorded");

        self.prune(&dir, max_retained);

        Ok(path)
    }

    /// Keep only the newest `max_retained` artifacts in `dir`
    fn prune(&self, dir: &Path, max_retained: usize) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), "Failed to list evidence dir for pruning: {}", e);
                return;
            }
        };

        let mut artifacts: Vec<PathBuf> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                path.is_file().then_some(path)
            })
            .collect();

        if artifacts.len() <= max_retained {
            return;
        }

        artifacts.sort();
        let excess = artifacts.len() - max_retained;
        for path in artifacts.into_iter().take(excess) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Pruned old evidence artifact"),
                Err(e) => {
                    warn!(path = %path.display(), "Failed to delete old artifact: {}", e);
                }
            }
        }
    }

    /// Number of artifacts currently retained for a session
    pub fn artifact_count(&self, session_id: Uuid) -> usize {
        match std::fs::read_dir(self.session_dir(session_id)) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .count(),
            Err(_) => 0,
        }
    }
}
