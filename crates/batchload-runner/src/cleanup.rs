//! Bulk removal of `.failed` markers.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::discovery::{FAILED_EXTENSION, list_files_with_extension};
use crate::error::{Result, RunError};

/// Removes every `*.failed` marker in `dir` and returns the removed paths.
/// A missing `dir` has nothing to clean.
pub fn clean_failed_markers(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no directory to clean");
        return Ok(Vec::new());
    }
    let markers = list_files_with_extension(dir, FAILED_EXTENSION)?;
    for marker in &markers {
        fs::remove_file(marker).map_err(|source| RunError::Remove {
            path: marker.clone(),
            source,
        })?;
        info!(marker = %marker.display(), "removed failed marker");
    }
    Ok(markers)
}
