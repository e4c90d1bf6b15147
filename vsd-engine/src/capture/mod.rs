//! Capture target resolution and frame acquisition

pub mod fs;
pub mod stub;

pub use fs::FsCaptureSource;
pub use stub::StubCaptureSource;

use async_trait::async_trait;

use crate::models::{CaptureRegion, CapturedFrame};
use vsd_common::Result;

/// Resolves capture targets and grabs frames from them
///
/// `locate` answers "is this target visible right now"; `None` is a normal
/// answer, not an error. `capture` failures are transient: the session loop
/// logs them and skips the tick.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn locate(&self, target: &str) -> Option<CaptureRegion>;

    async fn capture(&self, target: &str, region: &CaptureRegion) -> Result<CapturedFrame>;
}
