//! Data models for the detection engine
//!
//! Plain structs shared between the engine loops, the persistence layer,
//! and the HTTP handlers.

pub mod detection;
pub mod job;
pub mod session;

pub use detection::{
    default_categories, CaptureRegion, CapturedFrame, ClassifierOutput, Detection,
    DetectionEvent, DEFAULT_CONFIDENCE_THRESHOLD,
};
pub use job::{BatchJob, JobResultItem, JobStatus, JobSummary};
pub use session::{SessionConfig, SessionSnapshot, SessionState, SessionStats};
