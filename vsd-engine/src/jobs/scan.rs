//! Image file enumeration for batch jobs

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use vsd_common::{Error, Result};

/// Check if extension names an image format we accept
pub fn is_image_extension(ext: &str) -> bool {
    matches!(ext, "jpg" | "jpeg" | "png" | "bmp" | "gif" | "webp")
}

/// Check if path looks like an image file, by extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_image_extension(&ext.to_string_lossy().to_lowercase()))
        .unwrap_or(false)
}

/// Enumerate image files under `folder`
///
/// Non-recursive scans stay at the top level. Unreadable entries are logged
/// and skipped. Results are sorted by path so job item order is stable, then
/// truncated to `limit` when given.
pub fn enumerate_images(
    folder: &Path,
    recursive: bool,
    limit: Option<usize>,
) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(Error::InvalidInput(format!(
            "folder not found: {}",
            folder.display()
        )));
    }
    if !folder.is_dir() {
        return Err(Error::InvalidInput(format!(
            "not a directory: {}",
            folder.display()
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(folder).follow_links(false).max_depth(max_depth) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_image_file(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
            Err(e) => {
                tracing::warn!("Error accessing entry during scan: {}", e);
            }
        }
    }

    files.sort();
    if let Some(limit) = limit {
        files.truncate(limit);
    }

    Ok(files)
}
