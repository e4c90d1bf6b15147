//! Integration tests for the batch job engine
//!
//! Drives JobEngine directly against a scratch database; the classifier is
//! scripted per item through the file contents.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use helpers::{ScriptedClassifier, FAIL_MARKER, SMOKE_MARKER};
use vsd_common::Error;
use vsd_engine::db;
use vsd_engine::jobs::JobEngine;
use vsd_engine::models::{BatchJob, JobStatus};

fn test_engine(pool: sqlx::SqlitePool) -> JobEngine {
    JobEngine::new(pool, Arc::new(ScriptedClassifier))
}

/// Poll job status until it leaves Processing
async fn wait_for_terminal(engine: &JobEngine, job_id: Uuid) -> BatchJob {
    for _ in 0..200 {
        let job = engine.status(job_id).await.expect("job should exist");
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never reached a terminal state", job_id);
}

#[tokio::test]
async fn test_failing_item_skips_row_but_job_completes() {
    let (dir, pool) = helpers::test_pool().await;
    let engine = test_engine(pool);

    let items = vec![
        helpers::write_image(dir.path(), "one.jpg", SMOKE_MARKER),
        helpers::write_image(dir.path(), "two.jpg", FAIL_MARKER),
        helpers::write_image(dir.path(), "three.jpg", b"nothing here"),
    ];

    let job = engine.submit(items, 0.5).await.unwrap();
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.total_items, 3);

    let done = wait_for_terminal(&engine, job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    // The failed item gets no result row but still counts as processed.
    assert_eq!(done.processed_items, 3);
    assert!(done.error_message.is_none());
    assert!(done.completed_at.is_some());

    let (results, summary) = engine.results(job.id).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].filename, "one.jpg");
    assert!(results[0].matched);
    assert_eq!(results[0].detections[0].category.as_deref(), Some("cigarette"));
    assert_eq!(results[1].filename, "three.jpg");
    assert!(!results[1].matched);

    assert_eq!(summary.total_images, 2);
    assert_eq!(summary.images_with_cigarettes, 1);
    assert_eq!(summary.detection_rate, 50.0);
}

#[tokio::test]
async fn test_missing_file_counts_as_processed() {
    let (dir, pool) = helpers::test_pool().await;
    let engine = test_engine(pool);

    let job = engine
        .submit(vec![dir.path().join("does-not-exist.jpg")], 0.5)
        .await
        .unwrap();

    let done = wait_for_terminal(&engine, job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.processed_items, 1);

    let (results, summary) = engine.results(job.id).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(summary.total_images, 0);
    assert_eq!(summary.detection_rate, 0.0);
}

#[tokio::test]
async fn test_threshold_filters_out_low_confidence() {
    let (dir, pool) = helpers::test_pool().await;
    let engine = test_engine(pool);

    // Scripted smoke detection reports 0.9; a higher threshold removes it.
    let items = vec![helpers::write_image(dir.path(), "smoke.jpg", SMOKE_MARKER)];
    let job = engine.submit(items, 0.95).await.unwrap();

    let done = wait_for_terminal(&engine, job.id).await;
    assert_eq!(done.status, JobStatus::Completed);

    let (results, summary) = engine.results(job.id).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].matched);
    assert!(results[0].detections.is_empty());
    assert_eq!(summary.images_with_cigarettes, 0);
}

#[tokio::test]
async fn test_status_for_unknown_job_is_not_found() {
    let (_dir, pool) = helpers::test_pool().await;
    let engine = test_engine(pool);

    let err = engine.status(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_results_before_completion_is_invalid_state() {
    let (_dir, pool) = helpers::test_pool().await;
    let engine = test_engine(pool.clone());

    // A job row with no worker stays in Processing forever.
    let job = BatchJob::new(3);
    db::jobs::insert_job(&pool, &job).await.unwrap();

    let err = engine.results(job.id).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_empty_batch_completes_with_empty_summary() {
    let (_dir, pool) = helpers::test_pool().await;
    let engine = test_engine(pool);

    let job = engine.submit(Vec::new(), 0.5).await.unwrap();
    assert_eq!(job.total_items, 0);

    let done = wait_for_terminal(&engine, job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.processed_items, 0);

    let (results, summary) = engine.results(job.id).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(summary.detection_rate, 0.0);
}
