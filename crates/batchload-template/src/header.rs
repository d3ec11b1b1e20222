//! Header-row inspection for delimited data files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use batchload_config::DEFAULT_DELIMITER;

/// Header name of the GUID column, matched case-insensitively.
pub const REQUIRED_ID_COLUMN: &str = "id";

/// Reads only the first line of `data_file` and splits it into trimmed,
/// non-empty header names. Returns an empty list when the file cannot be read.
pub fn read_header_fields(data_file: &Path, delimiter: Option<char>) -> Vec<String> {
    let Ok(file) = File::open(data_file) else {
        return Vec::new();
    };
    let mut line = String::new();
    if BufReader::new(file).read_line(&mut line).is_err() {
        return Vec::new();
    }
    let line = line.trim_end_matches(['\r', '\n']);
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);
    line.split(delimiter.unwrap_or(DEFAULT_DELIMITER))
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

/// 1-based position of the `id` column among `headers`.
pub fn find_id_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(REQUIRED_ID_COLUMN))
        .map(|index| index + 1)
}
