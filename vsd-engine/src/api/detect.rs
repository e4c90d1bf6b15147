//! Single-image detection endpoint
//!
//! Synchronous convenience wrapper around the classifier adapter; batch
//! work goes through /jobs instead.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::capture::fs::read_frame;
use crate::error::{ApiError, ApiResult};
use crate::jobs::scan::is_image_file;
use crate::models::{
    default_categories, DetectionEvent, JobResultItem, DEFAULT_CONFIDENCE_THRESHOLD,
};
use crate::AppState;

/// POST /detect request
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub image_path: String,
    pub confidence_threshold: Option<f32>,
}

/// POST /detect
///
/// Classify one image file and report the verdict in the same shape as a
/// batch result row.
pub async fn detect_image(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> ApiResult<Json<JobResultItem>> {
    let path = std::path::Path::new(&request.image_path);
    if !path.is_file() {
        return Err(ApiError::BadRequest(format!(
            "Image file does not exist: {}",
            request.image_path
        )));
    }
    if !is_image_file(path) {
        return Err(ApiError::BadRequest(format!(
            "Not an image file: {}",
            request.image_path
        )));
    }

    let threshold = request
        .confidence_threshold
        .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);

    let frame = read_frame(path)?;
    let output = state.classifier.classify(&frame, threshold).await?;
    let event = DetectionEvent::derive(Utc::now(), output, &default_categories());

    tracing::debug!(
        image = %request.image_path,
        matched = event.is_positive(),
        "Single-image detection"
    );

    Ok(Json(JobResultItem {
        filename: path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| request.image_path.clone()),
        matched: event.is_positive(),
        max_confidence: event.max_confidence(),
        detections: event.detections,
    }))
}

pub fn detect_routes() -> Router<AppState> {
    Router::new().route("/detect", post(detect_image))
}
