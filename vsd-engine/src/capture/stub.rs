//! Scripted capture source for tests

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::CaptureSource;
use crate::models::{CaptureRegion, CapturedFrame};
use vsd_common::Result;

/// Capture source with a toggleable target and a fixed frame
pub struct StubCaptureSource {
    visible: AtomicBool,
    frame_bytes: Vec<u8>,
}

impl StubCaptureSource {
    /// Target visible, every capture yields the same small frame
    pub fn new() -> Self {
        Self {
            visible: AtomicBool::new(true),
            frame_bytes: vec![0u8; 4],
        }
    }

    /// Target never found
    pub fn hidden() -> Self {
        let source = Self::new();
        source.visible.store(false, Ordering::SeqCst);
        source
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

impl Default for StubCaptureSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureSource for StubCaptureSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn locate(&self, _target: &str) -> Option<CaptureRegion> {
        if self.visible.load(Ordering::SeqCst) {
            Some(CaptureRegion::full_frame())
        } else {
            None
        }
    }

    async fn capture(&self, _target: &str, _region: &CaptureRegion) -> Result<CapturedFrame> {
        Ok(CapturedFrame::new(self.frame_bytes.clone(), "png"))
    }
}
