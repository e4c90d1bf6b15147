//! Directory-backed capture source
//!
//! A target is "visible" when its spool directory under the configured root
//! contains at least one image file; capturing reads the newest one. This is
//! the default wiring and the integration-test vehicle; a real screen
//! grabber plugs in behind the same trait.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::debug;

use super::CaptureSource;
use crate::jobs::scan::is_image_file;
use crate::models::{CaptureRegion, CapturedFrame};
use vsd_common::{Error, Result};

pub struct FsCaptureSource {
    root: PathBuf,
}

impl FsCaptureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn target_dir(&self, target: &str) -> PathBuf {
        self.root.join(target)
    }

    /// Newest image file in the target's spool directory, by modified time
    fn newest_image(&self, target: &str) -> Option<PathBuf> {
        let dir = self.target_dir(target);
        let entries = std::fs::read_dir(&dir).ok()?;

        entries
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let path = entry.path();
                if !path.is_file() || !is_image_file(&path) {
                    return None;
                }
                let modified = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                Some((path, modified))
            })
            .max_by_key(|(_, modified)| *modified)
            .map(|(path, _)| path)
    }
}

#[async_trait]
impl CaptureSource for FsCaptureSource {
    fn name(&self) -> &'static str {
        "fs"
    }

    async fn locate(&self, target: &str) -> Option<CaptureRegion> {
        match self.newest_image(target) {
            Some(_) => Some(CaptureRegion::full_frame()),
            None => {
                debug!(target = target, "Target not visible (no spooled frames)");
                None
            }
        }
    }

    async fn capture(&self, target: &str, _region: &CaptureRegion) -> Result<CapturedFrame> {
        let path = self.newest_image(target).ok_or_else(|| {
            Error::Capture(format!("no frame available for target '{}'", target))
        })?;

        read_frame(&path)
    }
}

/// Read one image file into a captured frame
pub fn read_frame(path: &Path) -> Result<CapturedFrame> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::Capture(format!("failed to read frame {}: {}", path.display(), e)))?;

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "png".to_string());

    Ok(CapturedFrame::new(bytes, extension))
}
