//! Sequential batch runs.
//!
//! Each candidate file goes through: template lookup, optional delete
//! template synthesis, invocation, and outcome classification. A problem
//! with one file is recorded and the run moves on; only missing
//! prerequisites abort it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use batchload_config::Settings;
use batchload_template::{
    TEMPLATE_SUFFIX, make_delete_template, template_candidates, template_stem,
};
use tracing::{debug, error, info, info_span, warn};

use crate::command::{CompatShim, build_invocation};
use crate::discovery::{RunMode, list_files_with_extension};
use crate::error::{Result, RunError};
use crate::process::ProcessRunner;

/// Everything a run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub mode: RunMode,
    /// Loader executable.
    pub executable: PathBuf,
    /// Runtime folder; the loader runs with this as its working directory.
    pub runtime_dir: PathBuf,
    /// CLI config handed to the loader.
    pub config: PathBuf,
    /// Settings read from `config`.
    pub settings: Settings,
    pub data_dir: PathBuf,
    /// Central templates folder; templates next to the data files otherwise.
    pub templates_dir: Option<PathBuf>,
    pub logs_dir: PathBuf,
    /// Where retry mode looks for `.failed` markers (defaults to `data_dir`).
    pub retry_dir: Option<PathBuf>,
    /// Output folder for generated delete templates.
    pub delete_templates_dir: PathBuf,
    pub shim: CompatShim,
}

impl RunPlan {
    /// Directory the candidate files are listed from.
    pub fn source_dir(&self) -> &Path {
        match (self.mode, &self.retry_dir) {
            (RunMode::Retry, Some(retry_dir)) => retry_dir,
            _ => &self.data_dir,
        }
    }

    /// Directory the per-file loader logs go to.
    pub fn mode_logs_dir(&self) -> PathBuf {
        match self.mode.logs_subdir() {
            Some(subdir) => self.logs_dir.join(subdir),
            None => self.logs_dir.clone(),
        }
    }

    /// Checks that every input directory of the plan exists.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("data dir", Some(self.data_dir.as_path())),
            ("templates dir", self.templates_dir.as_deref()),
            ("retry dir", Some(self.source_dir())),
        ];
        for (what, dir) in required {
            if let Some(dir) = dir
                && !dir.is_dir()
            {
                return Err(RunError::DirectoryNotFound {
                    what,
                    path: dir.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    /// Candidate files in processing order.
    pub fn candidates(&self) -> Result<Vec<PathBuf>> {
        let source_dir = self.source_dir();
        let extension = self.mode.extension();
        let files = list_files_with_extension(source_dir, extension)?;
        if files.is_empty() {
            return Err(RunError::NoCandidates {
                extension,
                path: source_dir.to_path_buf(),
            });
        }
        Ok(self.mode.order(files))
    }

    /// Template paths tried for `data_file`, in order.
    pub fn template_search_paths(&self, data_file: &Path) -> Vec<PathBuf> {
        let mut candidates = template_candidates(data_file, self.templates_dir.as_deref());
        // Markers may live outside the data dir; their templates do not.
        if self.mode == RunMode::Retry {
            let fallback = self
                .data_dir
                .join(format!("{}{TEMPLATE_SUFFIX}", template_stem(data_file)));
            if !candidates.contains(&fallback) {
                candidates.push(fallback);
            }
        }
        candidates
    }

    fn resolve_template(&self, data_file: &Path) -> Option<PathBuf> {
        let found = self
            .template_search_paths(data_file)
            .into_iter()
            .find(|candidate| candidate.is_file());
        debug!(
            data_file = %data_file.display(),
            template = ?found,
            "template lookup"
        );
        found
    }

    fn missing_template_hint(&self, data_file: &Path) -> String {
        self.template_search_paths(data_file)
            .iter()
            .map(|candidate| candidate.display().to_string())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The loader exited with code 0.
    Succeeded,
    /// The loader exited non-zero, or was killed (`code` is `None`).
    Failed { code: Option<i32> },
    /// The loader could not be started.
    LaunchFailed { message: String },
    /// The file was not handed to the loader.
    Skipped { reason: String },
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::LaunchFailed { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("ok"),
            Self::Failed { code: Some(code) } => write!(f, "non-zero exit ({code})"),
            Self::Failed { code: None } => f.write_str("terminated without an exit code"),
            Self::LaunchFailed { message } => write!(f, "failed to launch: {message}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Outcome of one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Data file stem (`001-User`).
    pub name: String,
    pub data_file: PathBuf,
    /// Template handed to the loader, when one was resolved.
    pub template: Option<PathBuf>,
    /// Loader log path, when the loader was invoked.
    pub log: Option<PathBuf>,
    pub outcome: FileOutcome,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: RunMode,
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Succeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(FileOutcome::is_failure)
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, FileOutcome::Skipped { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files
            .iter()
            .filter(|file| predicate(&file.outcome))
            .count()
    }
}

/// Runs the loader over every candidate file of `plan`, one at a time.
///
/// # Errors
///
/// Fails before any file is processed when a directory is missing, the
/// source directory holds no candidates, or the logs directory cannot be
/// created. Per-file problems are reported in the returned [`RunReport`].
pub fn run_batch<R>(plan: &RunPlan, runner: &mut R) -> Result<RunReport>
where
    R: ProcessRunner + ?Sized,
{
    plan.validate()?;
    let candidates = plan.candidates()?;
    let logs_dir = plan.mode_logs_dir();
    fs::create_dir_all(&logs_dir).map_err(|source| RunError::CreateDirectory {
        path: logs_dir.clone(),
        source,
    })?;

    info!(
        mode = %plan.mode,
        file_count = candidates.len(),
        source_dir = %plan.source_dir().display(),
        "starting run"
    );
    let started = Instant::now();
    let files: Vec<FileReport> = candidates
        .into_iter()
        .map(|data_file| process_file(plan, &mut *runner, &logs_dir, data_file))
        .collect();

    let report = RunReport {
        mode: plan.mode,
        files,
    };
    info!(
        mode = %plan.mode,
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped(),
        duration_ms = started.elapsed().as_millis(),
        "run complete"
    );
    Ok(report)
}

fn process_file<R>(plan: &RunPlan, runner: &mut R, logs_dir: &Path, data_file: PathBuf) -> FileReport
where
    R: ProcessRunner + ?Sized,
{
    let name = template_stem(&data_file);
    let span = info_span!("file", name = %name);
    let _guard = span.enter();

    let mut report = FileReport {
        name: name.clone(),
        data_file,
        template: None,
        log: None,
        outcome: FileOutcome::Succeeded,
    };

    let Some(add_template) = plan.resolve_template(&report.data_file) else {
        let reason = format!(
            "missing template ({})",
            plan.missing_template_hint(&report.data_file)
        );
        warn!("[SKIP] {name}: {reason}");
        report.outcome = FileOutcome::Skipped { reason };
        return report;
    };

    let template = if plan.mode == RunMode::Delete {
        match make_delete_template(
            &add_template,
            &plan.delete_templates_dir,
            Some(&report.data_file),
            plan.settings.first_row,
            plan.settings.delimiter,
        ) {
            Ok(generated) => generated.path,
            Err(error) => {
                let reason = format!("could not build delete template: {error}");
                warn!("[SKIP] {name}: {reason}");
                report.template = Some(add_template);
                report.outcome = FileOutcome::Skipped { reason };
                return report;
            }
        }
    } else {
        add_template
    };
    report.template = Some(template.clone());

    let log = logs_dir.join(plan.mode.log_file_name(&name));
    report.log = Some(log.clone());
    info!("[{}] {name}", plan.mode.label());

    let invocation = match build_invocation(
        &plan.executable,
        &plan.config,
        &report.data_file,
        &template,
        &log,
        plan.shim,
    ) {
        Ok(invocation) => invocation,
        Err(error) => {
            error!(%error, "could not resolve loader arguments");
            report.outcome = FileOutcome::LaunchFailed {
                message: error.to_string(),
            };
            return report;
        }
    };

    report.outcome = match runner.run(&invocation, &plan.runtime_dir) {
        Ok(exit) if exit.success() => {
            info!(log = %log.display(), "loader finished");
            FileOutcome::Succeeded
        }
        Ok(exit) => {
            let outcome = FileOutcome::Failed { code: exit.code };
            warn!(log = %log.display(), "{outcome}; check {}", log.display());
            outcome
        }
        Err(error) => {
            error!(%error, program = %invocation.program().display(), "could not launch loader");
            FileOutcome::LaunchFailed {
                message: error.to_string(),
            }
        }
    };
    report
}
