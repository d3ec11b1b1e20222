//! Batch loader run orchestration.
//!
//! A run walks the data directory in mode-specific order, pairs each file
//! with its template, and launches the loader once per file, strictly one
//! at a time. The loader itself sits behind [`ProcessRunner`] so runs can be
//! exercised without it.

pub mod cleanup;
pub mod command;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod runtime;

pub use cleanup::clean_failed_markers;
pub use command::{CompatShim, Invocation, build_invocation};
pub use discovery::{DATA_EXTENSION, FAILED_EXTENSION, RunMode, list_files_with_extension};
pub use error::{Result, RunError};
pub use orchestrator::{FileOutcome, FileReport, RunPlan, RunReport, run_batch};
pub use process::{ProcessExit, ProcessRunner, SystemProcessRunner};
pub use runtime::{LOADER_EXE_NAME, detect_compat_shim, find_on_path, loader_executable};
