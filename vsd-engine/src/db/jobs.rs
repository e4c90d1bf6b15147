//! Batch job database operations
//!
//! Progress is written after every item so a status query never sees a
//! counter more than one item stale.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{BatchJob, Detection, JobResultItem, JobStatus};
use vsd_common::{Error, Result};

fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

/// Insert a freshly submitted job
pub async fn insert_job(pool: &SqlitePool, job: &BatchJob) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO batch_jobs (
            id, status, total_items, processed_items,
            error_message, created_at, completed_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(job.id.to_string())
    .bind(job.status.as_str())
    .bind(job.total_items as i64)
    .bind(job.processed_items as i64)
    .bind(&job.error_message)
    .bind(job.created_at.to_rfc3339())
    .bind(job.completed_at.map(|dt| dt.to_rfc3339()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a job by id
pub async fn get_job(pool: &SqlitePool, job_id: Uuid) -> Result<Option<BatchJob>> {
    let row = sqlx::query(
        r#"
        SELECT status, total_items, processed_items, error_message, created_at, completed_at
        FROM batch_jobs
        WHERE id = ?
        "#,
    )
    .bind(job_id.to_string())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let status_str: String = row.get("status");
    let status = JobStatus::parse(&status_str)
        .ok_or_else(|| Error::Internal(format!("unknown job status '{}'", status_str)))?;

    let created_at: String = row.get("created_at");
    let created_at = parse_timestamp(&created_at, "created_at")?;

    let completed_at: Option<String> = row.get("completed_at");
    let completed_at = completed_at
        .map(|s| parse_timestamp(&s, "completed_at"))
        .transpose()?;

    Ok(Some(BatchJob {
        id: job_id,
        status,
        total_items: row.get::<i64, _>("total_items") as u32,
        processed_items: row.get::<i64, _>("processed_items") as u32,
        error_message: row.get("error_message"),
        created_at,
        completed_at,
    }))
}

/// Persist the processed-items counter
pub async fn update_progress(pool: &SqlitePool, job_id: Uuid, processed_items: u32) -> Result<()> {
    sqlx::query("UPDATE batch_jobs SET processed_items = ? WHERE id = ?")
        .bind(processed_items as i64)
        .bind(job_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Transition a job to the completed state
pub async fn mark_completed(pool: &SqlitePool, job_id: Uuid, at: DateTime<Utc>) -> Result<()> {
    sqlx::query("UPDATE batch_jobs SET status = 'completed', completed_at = ? WHERE id = ?")
        .bind(at.to_rfc3339())
        .bind(job_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Transition a job to the failed state with an error message
pub async fn mark_failed(
    pool: &SqlitePool,
    job_id: Uuid,
    message: &str,
    at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "UPDATE batch_jobs SET status = 'failed', error_message = ?, completed_at = ? WHERE id = ?",
    )
    .bind(message)
    .bind(at.to_rfc3339())
    .bind(job_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Append one per-item result row
pub async fn insert_result(pool: &SqlitePool, job_id: Uuid, item: &JobResultItem) -> Result<()> {
    let detections = serde_json::to_string(&item.detections)
        .map_err(|e| Error::Internal(format!("Failed to serialize detections: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO job_results (job_id, filename, matched, max_confidence, detections)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(job_id.to_string())
    .bind(&item.filename)
    .bind(item.matched)
    .bind(item.max_confidence)
    .bind(detections)
    .execute(pool)
    .await?;

    Ok(())
}

/// Result rows for a job, in processing order
pub async fn get_results(pool: &SqlitePool, job_id: Uuid) -> Result<Vec<JobResultItem>> {
    let rows = sqlx::query(
        r#"
        SELECT filename, matched, max_confidence, detections
        FROM job_results
        WHERE job_id = ?
        ORDER BY id
        "#,
    )
    .bind(job_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let detections: String = row.get("detections");
        let detections: Vec<Detection> = serde_json::from_str(&detections)
            .map_err(|e| Error::Internal(format!("Failed to deserialize detections: {}", e)))?;

        items.push(JobResultItem {
            filename: row.get("filename"),
            matched: row.get("matched"),
            max_confidence: row.get("max_confidence"),
            detections,
        });
    }

    Ok(items)
}
