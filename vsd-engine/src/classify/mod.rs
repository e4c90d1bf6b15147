//! Frame classification seam
//!
//! The vision model itself is external. The engine talks to it through the
//! [`FrameClassifier`] trait; [`RemoteClassifier`] is the wire adapter for a
//! served model and [`StubClassifier`] is the deterministic stand-in used
//! when no endpoint is configured and in tests.

pub mod remote;
pub mod stub;

pub use remote::RemoteClassifier;
pub use stub::StubClassifier;

use async_trait::async_trait;

use crate::models::{CapturedFrame, ClassifierOutput};
use vsd_common::Result;

/// Classifies one captured frame into raw detections
///
/// Implementations drop detections below `confidence_threshold`; verdict
/// derivation (category matching, max confidence) stays in the engine.
#[async_trait]
pub trait FrameClassifier: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn classify(
        &self,
        frame: &CapturedFrame,
        confidence_threshold: f32,
    ) -> Result<ClassifierOutput>;
}
