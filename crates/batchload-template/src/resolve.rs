//! Locate the add template for a data file.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Suffix of a template stored next to its data file.
pub const TEMPLATE_SUFFIX: &str = "_Template.xml";

/// File name without its final extension (`001-User.failed` -> `001-User`).
pub fn template_stem(data_file: &Path) -> String {
    data_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Candidate template paths for `data_file`, in search order.
pub fn template_candidates(data_file: &Path, templates_dir: Option<&Path>) -> Vec<PathBuf> {
    let stem = template_stem(data_file);
    let mut candidates = Vec::with_capacity(2);
    if let Some(dir) = templates_dir {
        candidates.push(dir.join(format!("{stem}.xml")));
    }
    candidates.push(data_file.with_file_name(format!("{stem}{TEMPLATE_SUFFIX}")));
    candidates
}

/// Returns the first existing template for `data_file`: `<templates_dir>/<stem>.xml`
/// when a templates directory is given, else `<data dir>/<stem>_Template.xml`.
pub fn find_template(data_file: &Path, templates_dir: Option<&Path>) -> Option<PathBuf> {
    let found = template_candidates(data_file, templates_dir)
        .into_iter()
        .find(|candidate| candidate.is_file());
    debug!(
        data_file = %data_file.display(),
        template = ?found,
        "template lookup"
    );
    found
}
