//! vsd-engine library interface
//!
//! Detection engine for the VSD service: batch image jobs, live monitoring
//! sessions, evidence retention, and the HTTP surface that drives them.
//! Exposed as a library so integration tests can build the router and
//! engine components directly.

pub mod api;
pub mod capture;
pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod evidence;
pub mod jobs;
pub mod models;
pub mod monitor;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::classify::FrameClassifier;
use crate::jobs::JobEngine;
use crate::monitor::MonitorRegistry;
use vsd_common::AlertHub;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Alert hub feeding SSE subscribers
    pub hub: AlertHub,
    /// Monitoring session registry
    pub registry: Arc<MonitorRegistry>,
    /// Batch job engine
    pub jobs: Arc<JobEngine>,
    /// Classifier for synchronous single-image requests
    pub classifier: Arc<dyn FrameClassifier>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        hub: AlertHub,
        registry: Arc<MonitorRegistry>,
        jobs: Arc<JobEngine>,
        classifier: Arc<dyn FrameClassifier>,
    ) -> Self {
        Self {
            db,
            hub,
            registry,
            jobs,
            classifier,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// `/health` stays at the root; everything else lives under `/api/v1`.
pub fn build_router(state: AppState) -> Router {
    let v1 = Router::new()
        .merge(api::detect_routes())
        .merge(api::job_routes())
        .merge(api::monitor_routes())
        .merge(api::alert_routes());

    Router::new()
        .merge(api::health_routes())
        .nest("/api/v1", v1)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
