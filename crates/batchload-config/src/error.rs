//! Error types for settings handling.

use std::path::PathBuf;

use batchload_common::XmlError;
use thiserror::Error;

/// Errors raised while synthesizing or writing a CLI config.
///
/// Reading individual settings never fails; see [`crate::read_setting`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The runtime config file does not exist.
    #[error("runtime config not found: {path}")]
    RuntimeConfigNotFound { path: PathBuf },

    /// The runtime config could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    /// The CLI config could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
