//! Loader runtime folder and host compatibility.

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::command::CompatShim;
use crate::error::{Result, RunError};

/// Executable inside the runtime folder.
pub const LOADER_EXE_NAME: &str = "BatchLoaderCmd.exe";

/// Path of the loader executable in `runtime_dir`, which must exist.
pub fn loader_executable(runtime_dir: &Path) -> Result<PathBuf> {
    let exe = runtime_dir.join(LOADER_EXE_NAME);
    if exe.is_file() {
        Ok(exe)
    } else {
        Err(RunError::ExecutableNotFound {
            name: LOADER_EXE_NAME,
            path: exe,
        })
    }
}

/// Searches `PATH` for an executable file named `name`.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// The loader is a native Windows binary; elsewhere it needs `wine`.
pub fn detect_compat_shim() -> Result<CompatShim> {
    if cfg!(windows) {
        return Ok(CompatShim::Native);
    }
    match find_on_path(CompatShim::WINE_PROGRAM) {
        Some(wine) => {
            debug!(wine = %wine.display(), "using compatibility shim");
            Ok(CompatShim::Wine)
        }
        None => Err(RunError::ShimNotFound {
            shim: CompatShim::WINE_PROGRAM,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_loader_executable() {
        let dir = TempDir::new().unwrap();
        let err = loader_executable(dir.path()).unwrap_err();
        assert!(err.to_string().starts_with("BatchLoaderCmd.exe not found"));

        fs::write(dir.path().join(LOADER_EXE_NAME), "MZ").unwrap();
        assert_eq!(
            loader_executable(dir.path()).unwrap(),
            dir.path().join(LOADER_EXE_NAME)
        );
    }

    #[test]
    fn test_find_on_path_misses_unknown_program() {
        assert_eq!(find_on_path("batchload-no-such-program-7f3a"), None);
    }
}
