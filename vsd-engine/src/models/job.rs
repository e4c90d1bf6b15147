//! Batch job data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::detection::Detection;

/// Batch job lifecycle states
///
/// `Processing` is entered at submit time; `Completed` and `Failed` are
/// terminal. There are no retries: a failed job stays failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One batch analysis job
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub total_items: u32,
    pub processed_items: u32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchJob {
    /// New job in the Processing state, nothing consumed yet
    pub fn new(total_items: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Processing,
            total_items,
            processed_items: 0,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Per-item result row recorded for each successfully classified item
///
/// `matched` rides the wire as `cigarette_detected` for compatibility with
/// existing report consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResultItem {
    pub filename: String,
    #[serde(rename = "cigarette_detected")]
    pub matched: bool,
    pub max_confidence: f64,
    pub detections: Vec<Detection>,
}

/// Aggregate summary served with job results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub total_images: usize,
    pub images_with_cigarettes: usize,
    pub detection_rate: f64,
}

impl JobSummary {
    /// Summarize result rows
    ///
    /// The denominator is the number of result rows, so items that failed
    /// to classify (and therefore have no row) do not dilute the rate. The
    /// rate is positives/total as a percentage, 0.0 when there are no rows.
    pub fn from_rows(rows: &[JobResultItem]) -> Self {
        let total = rows.len();
        let positives = rows.iter().filter(|r| r.matched).count();
        let rate = if total == 0 {
            0.0
        } else {
            positives as f64 / total as f64 * 100.0
        };
        Self {
            total_images: total,
            images_with_cigarettes: positives,
            detection_rate: rate,
        }
    }
}
