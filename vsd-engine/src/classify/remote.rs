//! HTTP adapter for a served vision model

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::FrameClassifier;
use crate::models::{CapturedFrame, ClassifierOutput, Detection};
use vsd_common::{Error, Result};

/// Default timeout for inference requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts frame bytes to an HTTP inference endpoint and parses the
/// detection list from its JSON response
///
/// Expected response shape:
///
/// ```json
/// { "detections": [ { "label": "cigarette", "confidence": 0.9,
///                     "bbox": [10, 20, 110, 220] } ] }
/// ```
///
/// The threshold is forwarded as a query parameter and re-applied locally
/// in case the endpoint ignores it.
pub struct RemoteClassifier {
    http_client: Client,
    endpoint: String,
}

impl RemoteClassifier {
    pub fn new(endpoint: String) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Classifier(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FrameClassifier for RemoteClassifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(
        &self,
        frame: &CapturedFrame,
        confidence_threshold: f32,
    ) -> Result<ClassifierOutput> {
        debug!(
            endpoint = %self.endpoint,
            frame_bytes = frame.bytes.len(),
            threshold = confidence_threshold,
            "Posting frame to inference endpoint"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&[("threshold", confidence_threshold.to_string())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(frame.bytes.clone())
            .send()
            .await
            .map_err(|e| Error::Classifier(format!("inference request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Classifier(format!(
                "inference endpoint returned {}: {}",
                status, body
            )));
        }

        let inference: InferenceResponse = response
            .json()
            .await
            .map_err(|e| Error::Classifier(format!("failed to parse inference response: {}", e)))?;

        let detections = filter_detections(inference.detections, confidence_threshold);

        debug!(detections = detections.len(), "Inference response parsed");

        Ok(ClassifierOutput { detections })
    }
}

/// Drop detections below the threshold
fn filter_detections(detections: Vec<Detection>, threshold: f32) -> Vec<Detection> {
    detections
        .into_iter()
        .filter(|d| d.confidence >= f64::from(threshold))
        .collect()
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    #[serde(default)]
    detections: Vec<Detection>,
}
