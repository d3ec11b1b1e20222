//! Loader command-line construction.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use batchload_common::absolute_path;

/// How the loader executable is launched on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatShim {
    /// Run the executable directly.
    Native,
    /// Run it through `wine`.
    Wine,
}

impl CompatShim {
    pub const WINE_PROGRAM: &'static str = "wine";

    fn program(self) -> Option<&'static str> {
        match self {
            Self::Native => None,
            Self::Wine => Some(Self::WINE_PROGRAM),
        }
    }
}

/// A fully resolved loader invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Program followed by its arguments, lossily converted for display.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy().into_owned())
            .collect()
    }

    /// A [`Command`] ready to spawn in `working_dir`.
    pub fn to_command(&self, working_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(working_dir);
        command
    }
}

/// Builds `[shim] exe -d data -c config -t template -l log`.
///
/// Every path is made absolute first: the loader runs with its working
/// directory set to the runtime folder.
pub fn build_invocation(
    exe: &Path,
    config: &Path,
    data: &Path,
    template: &Path,
    log: &Path,
    shim: CompatShim,
) -> io::Result<Invocation> {
    let exe = absolute_path(exe)?;
    let flagged = [("-d", data), ("-c", config), ("-t", template), ("-l", log)];

    let mut args: Vec<OsString> = Vec::with_capacity(1 + flagged.len() * 2);
    let program = match shim.program() {
        Some(shim_program) => {
            args.push(exe.into_os_string());
            PathBuf::from(shim_program)
        }
        None => exe,
    };
    for (flag, path) in flagged {
        args.push(OsStr::new(flag).to_os_string());
        args.push(absolute_path(path)?.into_os_string());
    }
    Ok(Invocation { program, args })
}
