use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use batchload_common::absolute_path;
use batchload_config::{
    DEFAULT_CLI_CONFIG_NAME, RUNTIME_CONFIG_NAME, Settings, build_cli_config_from_runtime,
    resolve_init_target, write_cli_config,
};
use batchload_runner::{
    CompatShim, RunMode, RunPlan, RunReport, SystemProcessRunner, clean_failed_markers,
    detect_compat_shim, loader_executable, run_batch,
};

use crate::cli::{CleanFailedArgs, InitConfigArgs, RunArgs};

/// Loader runtime resolved from flags and the CLI config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime {
    pub config: PathBuf,
    pub settings: Settings,
    pub runtime_dir: PathBuf,
    pub executable: PathBuf,
}

/// CLI config path: `--bl-config`, else `./CLIBatchLoaderConfig.xml`.
pub fn cli_config_path(requested: Option<&Path>) -> PathBuf {
    requested
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".").join(DEFAULT_CLI_CONFIG_NAME))
}

/// Locates the CLI config and the loader executable. `--bl-dir` beats
/// `<loader_dir>`.
pub fn resolve_runtime(args: &RunArgs) -> Result<Runtime> {
    let config = cli_config_path(args.bl_config.as_deref());
    if !config.is_file() {
        bail!(
            "CLI config XML (e.g. {DEFAULT_CLI_CONFIG_NAME}) not found: {}",
            config.display()
        );
    }
    let settings = Settings::load(&config);

    let runtime_dir = args
        .bl_dir
        .clone()
        .or_else(|| settings.loader_dir.clone())
        .ok_or_else(|| {
            anyhow!(
                "no runtime provided; set --bl-dir or <loader_dir> in {}",
                config.display()
            )
        })?;
    let executable = loader_executable(&runtime_dir).context("locate loader runtime")?;
    debug!(
        runtime_dir = %runtime_dir.display(),
        executable = %executable.display(),
        "resolved runtime"
    );

    Ok(Runtime {
        config,
        settings,
        runtime_dir,
        executable,
    })
}

/// Everything a run needs, checked before any file is touched. The host
/// shim is only detected once config, runtime and directories are valid.
pub fn plan_run(
    mode: RunMode,
    args: &RunArgs,
    retry_dir: Option<&Path>,
    delete_templates_dir: &Path,
    detect_shim: impl FnOnce() -> Result<CompatShim>,
) -> Result<RunPlan> {
    let runtime = resolve_runtime(args)?;
    let plan = RunPlan {
        mode,
        executable: runtime.executable,
        runtime_dir: runtime.runtime_dir,
        config: runtime.config,
        settings: runtime.settings,
        data_dir: args.data_dir.clone(),
        templates_dir: args.templates_dir.clone(),
        logs_dir: args.logs_dir.clone(),
        retry_dir: retry_dir.map(Path::to_path_buf),
        delete_templates_dir: delete_templates_dir.to_path_buf(),
        shim: CompatShim::Native,
    };
    plan.validate().context("check run directories")?;
    Ok(RunPlan {
        shim: detect_shim()?,
        ..plan
    })
}

/// Host shim for the loader; fails when none is available.
pub fn host_shim() -> Result<CompatShim> {
    detect_compat_shim().context("check host compatibility")
}

pub fn execute_plan(plan: &RunPlan) -> Result<RunReport> {
    run_batch(plan, &mut SystemProcessRunner)
        .with_context(|| format!("{} run aborted", plan.mode))
}

pub fn run_clean_failed(args: &CleanFailedArgs) -> Result<Vec<PathBuf>> {
    let removed = clean_failed_markers(&args.data_dir).context("clean failed markers")?;
    info!(
        data_dir = %args.data_dir.display(),
        removed = removed.len(),
        "cleaned failed markers"
    );
    Ok(removed)
}

/// Writes a CLI config derived from `<bl-dir>/BatchLoaderConfig.xml` and
/// returns its absolute path.
pub fn run_init_config(args: &InitConfigArgs) -> Result<PathBuf> {
    if !args.from_runtime {
        bail!("init-config requires --from-runtime");
    }
    let Some(runtime_dir) = args.bl_dir.as_deref() else {
        bail!("--from-runtime requires --bl-dir to locate the runtime config");
    };

    let target = resolve_init_target(args.bl_config.as_deref());
    let runtime_config = runtime_dir.join(RUNTIME_CONFIG_NAME);
    let document = build_cli_config_from_runtime(&runtime_config, runtime_dir)
        .context("failed to initialize CLI config")?;
    write_cli_config(&document, &target).context("failed to initialize CLI config")?;

    Ok(absolute_path(&target).unwrap_or(target))
}
