//! Lexical path helpers.
//!
//! The loader is launched with its working directory set to the runtime
//! folder, so every path handed to it must be absolute. These helpers never
//! touch the filesystem: the paths may name files that do not exist yet
//! (log files, generated templates).

use std::io;
use std::path::{Component, Path, PathBuf};

/// Removes `.` components and folds `..` into the preceding component.
///
/// A `..` that would climb above the root of an absolute path is dropped;
/// on a relative path it is preserved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolves `path` against the current directory and normalizes it.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize_path(&std::path::absolute(path)?))
}
