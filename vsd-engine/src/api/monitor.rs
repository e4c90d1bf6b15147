//! Monitoring session API handlers
//!
//! POST /monitor/start, POST /monitor/stop, GET /monitor/sessions/:id,
//! GET /monitor/recent

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::detections::{recent_detections, DetectionRow};
use crate::error::{ApiError, ApiResult};
use crate::models::{SessionConfig, SessionSnapshot, SessionState};
use crate::AppState;

/// Upper bound for the recent-detections page size
const MAX_RECENT_LIMIT: u32 = 100;

/// POST /monitor/start request
#[derive(Debug, Deserialize)]
pub struct StartMonitorRequest {
    pub session_id: Uuid,
    pub targets: Option<Vec<String>>,
    pub poll_interval_secs: Option<u64>,
    pub cooldown_secs: Option<u64>,
    pub max_artifacts: Option<usize>,
    pub categories: Option<Vec<String>>,
    pub confidence_threshold: Option<f32>,
}

impl StartMonitorRequest {
    fn into_config(self) -> Result<SessionConfig, ApiError> {
        let mut config = SessionConfig::default();

        if let Some(targets) = self.targets {
            if targets.is_empty() {
                return Err(ApiError::BadRequest("targets must not be empty".into()));
            }
            config.targets = targets;
        }
        if let Some(secs) = self.poll_interval_secs {
            if secs == 0 {
                return Err(ApiError::BadRequest(
                    "poll_interval_secs must be positive".into(),
                ));
            }
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = self.cooldown_secs {
            config.cooldown = Duration::from_secs(secs);
        }
        if let Some(max) = self.max_artifacts {
            if max == 0 {
                return Err(ApiError::BadRequest("max_artifacts must be positive".into()));
            }
            config.max_artifacts = max;
        }
        if let Some(categories) = self.categories {
            config.categories = categories;
        }
        if let Some(threshold) = self.confidence_threshold {
            config.confidence_threshold = threshold;
        }

        Ok(config)
    }
}

/// POST /monitor/stop request
#[derive(Debug, Deserialize)]
pub struct StopMonitorRequest {
    pub session_id: Uuid,
}

/// POST /monitor/stop response
#[derive(Debug, Serialize)]
pub struct StopMonitorResponse {
    pub session_id: Uuid,
    pub state: SessionState,
}

/// GET /monitor/recent query parameters
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub session_id: Option<Uuid>,
    pub limit: Option<u32>,
}

/// GET /monitor/recent response
#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub detections: Vec<DetectionRow>,
}

/// POST /monitor/start
///
/// Idempotent: starting a session that is already running returns its
/// current snapshot untouched.
pub async fn start_monitor(
    State(state): State<AppState>,
    Json(request): Json<StartMonitorRequest>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session_id = request.session_id;
    let config = request.into_config()?;
    let snapshot = state.registry.start(session_id, config).await?;
    Ok(Json(snapshot))
}

/// POST /monitor/stop
///
/// Idempotent; stopping an unknown session succeeds.
pub async fn stop_monitor(
    State(state): State<AppState>,
    Json(request): Json<StopMonitorRequest>,
) -> ApiResult<Json<StopMonitorResponse>> {
    state.registry.stop(request.session_id).await?;
    Ok(Json(StopMonitorResponse {
        session_id: request.session_id,
        state: SessionState::Stopped,
    }))
}

/// GET /monitor/sessions/:session_id
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionSnapshot>> {
    let snapshot = state.registry.status(session_id).await?;
    Ok(Json(snapshot))
}

/// GET /monitor/recent?session_id=&limit=
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<RecentResponse>> {
    let limit = query.limit.unwrap_or(20).min(MAX_RECENT_LIMIT);
    let detections = recent_detections(&state.db, query.session_id, limit).await?;
    Ok(Json(RecentResponse { detections }))
}

pub fn monitor_routes() -> Router<AppState> {
    Router::new()
        .route("/monitor/start", post(start_monitor))
        .route("/monitor/stop", post(stop_monitor))
        .route("/monitor/sessions/:session_id", get(session_status))
        .route("/monitor/recent", get(recent))
}
