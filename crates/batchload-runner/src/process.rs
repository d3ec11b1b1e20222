//! Launching the loader.

use std::io;
use std::path::Path;

use tracing::debug;

use crate::command::Invocation;

/// How a loader process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProcessExit {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a loader invocation to completion.
pub trait ProcessRunner {
    /// Runs `invocation` in `working_dir` and blocks until it exits.
    fn run(&mut self, invocation: &Invocation, working_dir: &Path) -> io::Result<ProcessExit>;
}

/// Spawns real child processes that inherit stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&mut self, invocation: &Invocation, working_dir: &Path) -> io::Result<ProcessExit> {
        debug!(
            argv = ?invocation.argv(),
            working_dir = %working_dir.display(),
            "spawning loader"
        );
        let status = invocation.to_command(working_dir).status()?;
        Ok(ProcessExit {
            code: status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::command::{CompatShim, build_invocation};

    #[test]
    fn test_system_runner_reports_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        // `false` ignores its arguments and exits with 1.
        let exe = PathBuf::from("/bin/false");
        if !exe.exists() {
            return;
        }
        let invocation = build_invocation(
            &exe,
            &dir.path().join("c.xml"),
            &dir.path().join("d.txt"),
            &dir.path().join("t.xml"),
            &dir.path().join("l.log"),
            CompatShim::Native,
        )
        .unwrap();

        let exit = SystemProcessRunner.run(&invocation, dir.path()).unwrap();
        assert!(!exit.success());
        assert_eq!(exit.code, Some(1));
    }

    #[test]
    fn test_system_runner_missing_program() {
        let dir = tempfile::TempDir::new().unwrap();
        let invocation = build_invocation(
            &dir.path().join("BatchLoaderCmd.exe"),
            &dir.path().join("c.xml"),
            &dir.path().join("d.txt"),
            &dir.path().join("t.xml"),
            &dir.path().join("l.log"),
            CompatShim::Native,
        )
        .unwrap();

        assert!(SystemProcessRunner.run(&invocation, dir.path()).is_err());
    }
}
