//! Candidate file discovery and run modes.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, RunError};

/// Extension of loadable data files.
pub const DATA_EXTENSION: &str = "txt";

/// Extension of marker files left by failed loads.
pub const FAILED_EXTENSION: &str = "failed";

/// What a run does with each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Load data files with their add templates.
    Load,
    /// Delete records using generated delete templates, dependents first.
    Delete,
    /// Reload files previously marked as failed.
    Retry,
}

impl RunMode {
    /// Extension of the files this mode processes.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Load | Self::Delete => DATA_EXTENSION,
            Self::Retry => FAILED_EXTENSION,
        }
    }

    /// Logs subdirectory for this mode, if any.
    pub fn logs_subdir(self) -> Option<&'static str> {
        match self {
            Self::Load => None,
            Self::Delete => Some("delete"),
            Self::Retry => Some("retry"),
        }
    }

    /// Log file name for a data file stem.
    pub fn log_file_name(self, stem: &str) -> String {
        match self {
            Self::Retry => format!("{stem}.retry.log"),
            Self::Load | Self::Delete => format!("{stem}.log"),
        }
    }

    /// Puts candidates in processing order. Deletes run in reverse so that
    /// dependent files (higher prefixes, e.g. BOMs) go before their parents.
    pub fn order(self, mut files: Vec<PathBuf>) -> Vec<PathBuf> {
        if self == Self::Delete {
            files.reverse();
        }
        files
    }

    /// Short uppercase label used in progress output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Delete => "DELETE",
            Self::Retry => "RETRY",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "NORMAL",
            Self::Delete => "DELETE",
            Self::Retry => "RETRY",
        };
        f.write_str(name)
    }
}

/// Lists the files in `dir` whose extension matches `extension`
/// case-insensitively.
///
/// Returns files sorted by lower-cased file name.
pub fn list_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let read_error = |source| RunError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };
    let entries = std::fs::read_dir(dir).map_err(read_error)?;

    let mut files = Vec::new();
    for entry_result in entries {
        let path = entry_result.map_err(read_error)?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    Ok(files)
}
