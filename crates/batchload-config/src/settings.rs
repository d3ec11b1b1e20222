//! Soft readers for scalar settings.
//!
//! Every reader returns `None` rather than an error when the file is missing,
//! unreadable, malformed, or lacks the element: callers always have a default
//! to fall back on, and a bad config should surface where the value is used.

use std::path::{Path, PathBuf};

use batchload_common::{normalize_path, read_document};
use tracing::debug;

use crate::delimiter::normalize_delimiter;

/// Settings the driver consults, read once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Runtime folder holding the loader executable.
    pub loader_dir: Option<PathBuf>,
    /// Row where data starts; values above 1 mean row 1 is a header.
    pub first_row: Option<i64>,
    /// Normalized field delimiter.
    pub delimiter: Option<char>,
}

impl Settings {
    /// Reads all driver settings from the config at `config_path`.
    pub fn load(config_path: &Path) -> Self {
        let settings = Self {
            loader_dir: read_loader_dir(config_path),
            first_row: read_first_row(config_path),
            delimiter: read_delimiter(config_path),
        };
        debug!(
            config = %config_path.display(),
            loader_dir = ?settings.loader_dir,
            first_row = ?settings.first_row,
            delimiter = ?settings.delimiter,
            "loaded settings"
        );
        settings
    }

    /// True when data files carry a header row.
    pub fn header_expected(&self) -> bool {
        self.first_row.is_some_and(|row| row > 1)
    }
}

/// Returns the untrimmed text of the first root child named `name`.
fn read_raw_setting(config_path: &Path, name: &str) -> Option<String> {
    match read_document(config_path) {
        Ok(doc) => doc.root().find_child(name).map(|element| element.text()),
        Err(error) => {
            debug!(config = %config_path.display(), %error, "config unreadable");
            None
        }
    }
}

/// Returns the trimmed text of the first root child named `name`.
///
/// An element with empty text is reported as present with an empty value.
pub fn read_setting(config_path: &Path, name: &str) -> Option<String> {
    read_raw_setting(config_path, name).map(|value| value.trim().to_string())
}

/// Reads `<loader_dir>`, resolving a relative path against the directory
/// that contains the config file.
pub fn read_loader_dir(config_path: &Path) -> Option<PathBuf> {
    let value = read_setting(config_path, "loader_dir")?;
    if value.is_empty() {
        return None;
    }
    let path = PathBuf::from(value);
    if path.is_absolute() {
        return Some(path);
    }
    let config_path = std::path::absolute(config_path).ok()?;
    let base = config_path.parent().unwrap_or_else(|| Path::new(""));
    Some(normalize_path(&base.join(path)))
}

/// Reads `<first_row>` as an integer.
pub fn read_first_row(config_path: &Path) -> Option<i64> {
    let value = read_setting(config_path, "first_row")?;
    value.parse().ok()
}

/// Reads `<delimiter>` and normalizes it. Returns `None` only when the
/// element is absent or the config unreadable.
pub fn read_delimiter(config_path: &Path) -> Option<char> {
    read_raw_setting(config_path, "delimiter").map(|raw| normalize_delimiter(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("CLIBatchLoaderConfig.xml");
        fs::write(&path, format!("<BatchLoaderConfig>{body}</BatchLoaderConfig>")).unwrap();
        path
    }

    #[test]
    fn test_read_setting_trims_value() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "<server>  http://plm/InnovatorServer  </server>");
        assert_eq!(
            read_setting(&path, "server").as_deref(),
            Some("http://plm/InnovatorServer")
        );
        assert_eq!(read_setting(&path, "db"), None);
    }

    #[test]
    fn test_read_setting_first_occurrence_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "<db>first</db><db>second</db>");
        assert_eq!(read_setting(&path, "db").as_deref(), Some("first"));
    }

    #[test]
    fn test_read_setting_ignores_nested_elements() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "<group><db>nested</db></group>");
        assert_eq!(read_setting(&path, "db"), None);
    }

    #[test]
    fn test_malformed_config_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<BatchLoaderConfig><first_row>2</first_row>").unwrap();
        assert_eq!(read_first_row(&path), None);
        assert_eq!(read_delimiter(&path), None);
        assert_eq!(read_loader_dir(&path), None);
    }

    #[test]
    fn test_missing_config_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Settings::load(&dir.path().join("absent.xml")), Settings::default());
    }

    #[test]
    fn test_first_row_parsing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_first_row(&write_config(&dir, "<first_row> 2 </first_row>")), Some(2));
        assert_eq!(read_first_row(&write_config(&dir, "<first_row></first_row>")), None);
        assert_eq!(read_first_row(&write_config(&dir, "<first_row>two</first_row>")), None);
    }

    #[test]
    fn test_delimiter_keeps_literal_tab() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "<delimiter>\t</delimiter>");
        assert_eq!(read_delimiter(&path), Some('\t'));
        let path = write_config(&dir, "<delimiter> Pipe </delimiter>");
        assert_eq!(read_delimiter(&path), Some('|'));
        let path = write_config(&dir, "<delimiter/>");
        assert_eq!(read_delimiter(&path), Some('\t'));
    }

    #[test]
    fn test_loader_dir_relative_to_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "<loader_dir>../runtime/BatchLoader</loader_dir>");
        let expected = normalize_path(
            &std::path::absolute(dir.path())
                .unwrap()
                .join("../runtime/BatchLoader"),
        );
        assert_eq!(read_loader_dir(&path), Some(expected));
    }

    #[test]
    fn test_loader_dir_absolute_and_empty() {
        let dir = TempDir::new().unwrap();
        let absolute = std::path::absolute(dir.path()).unwrap().join("runtime");
        let path = write_config(
            &dir,
            &format!("<loader_dir>{}</loader_dir>", absolute.display()),
        );
        assert_eq!(read_loader_dir(&path), Some(absolute));
        let path = write_config(&dir, "<loader_dir>  </loader_dir>");
        assert_eq!(read_loader_dir(&path), None);
    }

    #[test]
    fn test_header_expected() {
        let mut settings = Settings::default();
        assert!(!settings.header_expected());
        settings.first_row = Some(1);
        assert!(!settings.header_expected());
        settings.first_row = Some(0);
        assert!(!settings.header_expected());
        settings.first_row = Some(2);
        assert!(settings.header_expected());
    }
}
