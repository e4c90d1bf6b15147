//! Alert stream and test-alert endpoints

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::AppState;
use vsd_common::Alert;

/// GET /alerts/stream
///
/// SSE stream of alert wire messages. The subscription unregisters itself
/// when the client disconnects and the stream is dropped.
pub async fn alert_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to alert stream");

    let mut subscription = state.hub.subscribe();

    let stream = async_stream::stream! {
        loop {
            match subscription.recv().await {
                Some(alert) => match serde_json::to_string(&alert.to_message()) {
                    Ok(json) => {
                        yield Ok(Event::default().event("detection").data(json));
                    }
                    Err(e) => {
                        warn!("Failed to serialize alert: {}", e);
                    }
                },
                // Hub delivery task gone; end the stream
                None => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}

fn default_kind() -> String {
    "smoking".to_string()
}

fn default_confidence() -> f64 {
    0.87
}

/// POST /alerts/test request
#[derive(Debug, Deserialize)]
pub struct TestAlertRequest {
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

impl Default for TestAlertRequest {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            confidence: default_confidence(),
        }
    }
}

/// POST /alerts/test response
#[derive(Debug, Serialize)]
pub struct TestAlertResponse {
    pub published: bool,
    pub subscribers: usize,
}

/// POST /alerts/test
///
/// Publish a synthetic alert through the hub so operators can verify the
/// delivery path end to end.
pub async fn test_alert(
    State(state): State<AppState>,
    request: Option<Json<TestAlertRequest>>,
) -> ApiResult<Json<TestAlertResponse>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    info!(kind = %request.kind, confidence = request.confidence, "Publishing test alert");

    state.hub.publish(Alert {
        session_id: "manual-test".to_string(),
        category: request.kind,
        max_confidence: request.confidence,
        timestamp: Utc::now(),
        screenshot_path: None,
    });

    Ok(Json(TestAlertResponse {
        published: true,
        subscribers: state.hub.subscriber_count(),
    }))
}

pub fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/alerts/stream", get(alert_stream))
        .route("/alerts/test", post(test_alert))
}
