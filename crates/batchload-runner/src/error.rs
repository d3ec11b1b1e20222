//! Error types for run orchestration.
//!
//! Everything here is a missing or broken prerequisite that aborts the whole
//! run. Problems with a single file (no template, bad template, non-zero
//! exit) are recorded in the run report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Directory not found or not a directory.
    #[error("{what} not found: {path}")]
    DirectoryNotFound { what: &'static str, path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create an output directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing to process.
    #[error("no *.{extension} files found in {path}")]
    NoCandidates {
        extension: &'static str,
        path: PathBuf,
    },

    /// The loader executable is missing from the runtime folder.
    #[error("{name} not found: {path}")]
    ExecutableNotFound { name: &'static str, path: PathBuf },

    /// A Windows executable on a host without the compatibility shim.
    #[error("Windows EXE detected and no '{shim}' found. Run on Windows/WSL or install {shim}.")]
    ShimNotFound { shim: &'static str },

    /// Failed to remove a marker file.
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for run operations.
pub type Result<T> = std::result::Result<T, RunError>;
