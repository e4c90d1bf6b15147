//! Batch job API handlers
//!
//! POST /jobs, GET /jobs/:id/status, GET /jobs/:id/results

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::jobs::scan::enumerate_images;
use crate::models::{JobResultItem, JobStatus, JobSummary, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::AppState;

/// POST /jobs request
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    pub folder: String,
    #[serde(default)]
    pub recursive: bool,
    pub limit: Option<usize>,
    pub confidence_threshold: Option<f32>,
}

/// POST /jobs response
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub total_images: u32,
}

/// Progress counters inside the status response
#[derive(Debug, Serialize)]
pub struct JobProgress {
    pub total: u32,
    pub processed: u32,
}

/// GET /jobs/:id/status response
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub progress: JobProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /jobs/:id/results response
#[derive(Debug, Serialize)]
pub struct JobResultsResponse {
    pub job_id: Uuid,
    pub results: Vec<JobResultItem>,
    pub summary: JobSummary,
}

/// POST /jobs
///
/// Enumerate image files in the folder and submit them as one batch job.
/// The job id comes back immediately; progress is polled via status.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> ApiResult<Json<SubmitJobResponse>> {
    let folder = std::path::Path::new(&request.folder);
    let items = enumerate_images(folder, request.recursive, request.limit)?;
    if items.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "No image files found in {}",
            request.folder
        )));
    }

    let threshold = request
        .confidence_threshold
        .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

    let job = state.jobs.submit(items, threshold).await?;

    Ok(Json(SubmitJobResponse {
        job_id: job.id,
        status: job.status,
        total_images: job.total_items,
    }))
}

/// GET /jobs/:job_id/status
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = state.jobs.status(job_id).await?;

    Ok(Json(JobStatusResponse {
        job_id: job.id,
        status: job.status,
        progress: JobProgress {
            total: job.total_items,
            processed: job.processed_items,
        },
        error: job.error_message,
    }))
}

/// GET /jobs/:job_id/results
///
/// 400 until the job has completed.
pub async fn job_results(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobResultsResponse>> {
    let (results, summary) = state.jobs.results(job_id).await?;

    Ok(Json(JobResultsResponse {
        job_id,
        results,
        summary,
    }))
}

pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(submit_job))
        .route("/jobs/:job_id/status", get(job_status))
        .route("/jobs/:job_id/results", get(job_results))
}
