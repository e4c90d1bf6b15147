//! Batch job worker task

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::capture::fs::read_frame;
use crate::classify::FrameClassifier;
use crate::db;
use crate::models::{default_categories, DetectionEvent, JobResultItem};
use vsd_common::Result;

/// Consumes one job's item list
///
/// Per item: read, classify, append a result row. An item that fails keeps
/// the job moving: it is logged, gets no row, and still counts as processed.
/// The progress counter is persisted after every item.
pub struct JobWorker {
    pool: SqlitePool,
    classifier: Arc<dyn FrameClassifier>,
    job_id: Uuid,
    items: Vec<PathBuf>,
    confidence_threshold: f32,
    categories: Vec<String>,
}

impl JobWorker {
    pub fn new(
        pool: SqlitePool,
        classifier: Arc<dyn FrameClassifier>,
        job_id: Uuid,
        items: Vec<PathBuf>,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            pool,
            classifier,
            job_id,
            items,
            confidence_threshold,
            categories: default_categories(),
        }
    }

    pub async fn run(self) {
        match self.process().await {
            Ok(()) => {}
            Err(e) => {
                error!(job_id = %self.job_id, "Batch job failed: {}", e);
                if let Err(e) =
                    db::jobs::mark_failed(&self.pool, self.job_id, &e.to_string(), Utc::now())
                        .await
                {
                    error!(job_id = %self.job_id, "Failed to record job failure: {}", e);
                }
            }
        }
    }

    async fn process(&self) -> Result<()> {
        let mut processed: u32 = 0;

        for path in &self.items {
            match self.classify_item(path).await {
                Ok(item) => {
                    db::jobs::insert_result(&self.pool, self.job_id, &item).await?;
                }
                Err(e) => {
                    warn!(
                        job_id = %self.job_id,
                        item = %path.display(),
                        "Item failed, skipping result row: {}",
                        e
                    );
                }
            }

            processed += 1;
            db::jobs::update_progress(&self.pool, self.job_id, processed).await?;
        }

        db::jobs::mark_completed(&self.pool, self.job_id, Utc::now()).await?;
        info!(job_id = %self.job_id, processed = processed, "Batch job completed");
        Ok(())
    }

    async fn classify_item(&self, path: &Path) -> Result<JobResultItem> {
        let frame = read_frame(path)?;
        let output = self
            .classifier
            .classify(&frame, self.confidence_threshold)
            .await?;
        let event = DetectionEvent::derive(Utc::now(), output, &self.categories);

        Ok(JobResultItem {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            matched: event.is_positive(),
            max_confidence: event.max_confidence(),
            detections: event.detections,
        })
    }
}
