//! Batch loader CLI.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use batchload_cli::cli::{
    Cli, Command, DEFAULT_DELETE_TEMPLATES_DIR, LogFormatArg, LogLevelArg, RunArgs,
};
use batchload_cli::commands::{execute_plan, host_shim, plan_run, run_clean_failed, run_init_config};
use batchload_cli::logging::{LogConfig, LogFormat, init_logging};
use batchload_cli::summary::{print_clean_report, print_run_header, print_run_summary};
use batchload_runner::RunMode;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match cli.command {
        Command::Load(args) => run(
            RunMode::Load,
            &args,
            None,
            Path::new(DEFAULT_DELETE_TEMPLATES_DIR),
        ),
        Command::Delete(args) => run(
            RunMode::Delete,
            &args.run,
            None,
            &args.delete_templates_dir,
        ),
        Command::Retry(args) => run(
            RunMode::Retry,
            &args.run,
            args.retry_dir.as_deref(),
            Path::new(DEFAULT_DELETE_TEMPLATES_DIR),
        ),
        Command::CleanFailed(args) => run_clean_failed(&args)
            .map(|removed| print_clean_report(&args.data_dir, &removed)),
        Command::InitConfig(args) => run_init_config(&args).map(|target| {
            println!("Initialized clean CLI config from runtime: {}", target.display());
        }),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// A completed run exits 0 even when files failed; the summary lists them.
fn run(
    mode: RunMode,
    args: &RunArgs,
    retry_dir: Option<&Path>,
    delete_templates_dir: &Path,
) -> Result<()> {
    let plan = plan_run(mode, args, retry_dir, delete_templates_dir, host_shim)?;
    print_run_header(&plan);
    let report = execute_plan(&plan)?;
    print_run_summary(&report);
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
