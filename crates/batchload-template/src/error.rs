//! Error types for template handling.

use std::fmt;
use std::path::PathBuf;

use batchload_common::XmlError;
use thiserror::Error;

/// Why the GUID column could not be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingIdReason {
    /// The header line could not be read or held no fields.
    HeaderUnreadable,
    /// The header was read but has no `id` field.
    NotInHeader,
}

impl fmt::Display for MissingIdReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderUnreadable => write!(
                f,
                "could not read the header row; verify <first_row> in the CLI config and the file encoding"
            ),
            Self::NotInHeader => write!(
                f,
                "the header must include an 'id' column holding the GUID of the item or relationship to delete"
            ),
        }
    }
}

/// Errors raised while deriving a delete template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template is not valid XML or has no `<Item>` element.
    #[error("malformed template {path}: {reason}")]
    MalformedTemplate { path: PathBuf, reason: String },

    /// The config says data files carry a header but no data file was given.
    #[error(
        "configuration mismatch: <first_row> is {first_row}, so a data file is required to find the 'id' column"
    )]
    ConfigurationMismatch { first_row: i64 },

    /// The data file has no usable `id` column.
    #[error("missing required 'id' column in {data_file}: {reason}")]
    MissingIdColumn {
        data_file: PathBuf,
        reason: MissingIdReason,
    },

    /// The delete template could not be written.
    #[error("failed to write delete template {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: XmlError,
    },
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::MissingIdColumn {
            data_file: PathBuf::from("data/010-Part.txt"),
            reason: MissingIdReason::NotInHeader,
        };
        assert!(
            err.to_string()
                .starts_with("missing required 'id' column in data/010-Part.txt")
        );

        let err = TemplateError::ConfigurationMismatch { first_row: 2 };
        assert!(err.to_string().contains("<first_row> is 2"));
    }
}
