//! Error types for XML document handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, parsing or writing an XML document.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Failed to read the source file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the target file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying parser rejected the input.
    #[error("XML error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// The document has no root element.
    #[error("document has no root element")]
    NoRoot,

    /// The input ended while an element was still open.
    #[error("unclosed element <{name}>")]
    Unclosed { name: String },

    /// Content after the root element was closed.
    #[error("unexpected <{name}> after the root element")]
    TrailingElement { name: String },
}

impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        Self::Parse(quick_xml::Error::from(err))
    }
}

/// Result type for XML operations.
pub type Result<T> = std::result::Result<T, XmlError>;
