//! Batch job submission and queries

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::worker::JobWorker;
use crate::classify::FrameClassifier;
use crate::db;
use crate::models::{BatchJob, JobResultItem, JobStatus, JobSummary};
use vsd_common::{Error, Result};

pub struct JobEngine {
    pool: SqlitePool,
    classifier: Arc<dyn FrameClassifier>,
}

impl JobEngine {
    pub fn new(pool: SqlitePool, classifier: Arc<dyn FrameClassifier>) -> Self {
        Self { pool, classifier }
    }

    /// Submit a batch job over the given image paths
    ///
    /// The job row is durable before the worker task spawns, so a status
    /// query racing the submit always finds the job.
    pub async fn submit(
        &self,
        items: Vec<PathBuf>,
        confidence_threshold: f32,
    ) -> Result<BatchJob> {
        let job = BatchJob::new(items.len() as u32);
        db::jobs::insert_job(&self.pool, &job).await?;

        info!(
            job_id = %job.id,
            total_items = job.total_items,
            "Batch job submitted"
        );

        let worker = JobWorker::new(
            self.pool.clone(),
            self.classifier.clone(),
            job.id,
            items,
            confidence_threshold,
        );
        tokio::spawn(worker.run());

        Ok(job)
    }

    /// Current job state; unknown id is NotFound
    pub async fn status(&self, job_id: Uuid) -> Result<BatchJob> {
        db::jobs::get_job(&self.pool, job_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("job {} not found", job_id)))
    }

    /// Result rows plus summary, available once the job has completed
    pub async fn results(&self, job_id: Uuid) -> Result<(Vec<JobResultItem>, JobSummary)> {
        let job = self.status(job_id).await?;
        if job.status != JobStatus::Completed {
            return Err(Error::InvalidState(format!(
                "job {} is {}, results are available once completed",
                job_id, job.status
            )));
        }

        let rows = db::jobs::get_results(&self.pool, job_id).await?;
        let summary = JobSummary::from_rows(&rows);
        Ok((rows, summary))
    }
}
