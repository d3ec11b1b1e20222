//! CLI argument definitions for the batch loader driver.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default directory for loader logs.
pub const DEFAULT_LOGS_DIR: &str = "./logs";

/// Default output directory for generated delete templates.
pub const DEFAULT_DELETE_TEMPLATES_DIR: &str = "./templates_delete";

#[derive(Parser)]
#[command(
    name = "batchload",
    version,
    about = "Drive BatchLoaderCmd.exe over a folder of data files",
    long_about = "Run BatchLoaderCmd.exe once per data file, in order.\n\n\
                  Each data file is paired with an add template; delete runs\n\
                  derive delete templates from those and process files in reverse."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load every *.txt data file with its add template.
    Load(RunArgs),

    /// Delete the records of every data file, dependents first.
    Delete(DeleteArgs),

    /// Reload files previously marked as *.failed.
    Retry(RetryArgs),

    /// Remove all *.failed markers from the data directory.
    CleanFailed(CleanFailedArgs),

    /// Write a clean CLI config derived from the runtime's BatchLoaderConfig.xml.
    InitConfig(InitConfigArgs),
}

/// Options shared by every run.
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Folder containing BatchLoaderCmd.exe and its DLLs (overrides <loader_dir>).
    #[arg(long = "bl-dir", value_name = "DIR")]
    pub bl_dir: Option<PathBuf>,

    /// CLI config XML (default: ./CLIBatchLoaderConfig.xml).
    #[arg(long = "bl-config", value_name = "PATH")]
    pub bl_config: Option<PathBuf>,

    /// Directory containing the *.txt data files.
    #[arg(long = "data-dir", value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Directory containing <name>.xml templates (default: <name>_Template.xml next to each data file).
    #[arg(long = "templates-dir", value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Directory receiving the loader logs.
    #[arg(long = "logs-dir", value_name = "DIR", default_value = DEFAULT_LOGS_DIR)]
    pub logs_dir: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Directory where delete templates are generated.
    #[arg(
        long = "delete-templates-dir",
        value_name = "DIR",
        default_value = DEFAULT_DELETE_TEMPLATES_DIR
    )]
    pub delete_templates_dir: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct RetryArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Directory searched for *.failed files (default: the data directory).
    #[arg(long = "retry-dir", value_name = "DIR")]
    pub retry_dir: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct CleanFailedArgs {
    /// Directory holding the *.failed markers.
    #[arg(long = "data-dir", value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct InitConfigArgs {
    /// Copy the settings from the runtime's BatchLoaderConfig.xml (required).
    #[arg(long = "from-runtime")]
    pub from_runtime: bool,

    /// Runtime folder containing BatchLoaderConfig.xml.
    #[arg(long = "bl-dir", value_name = "DIR")]
    pub bl_dir: Option<PathBuf>,

    /// Output file or directory (default: ./CLIBatchLoaderConfig.xml).
    #[arg(long = "bl-config", value_name = "PATH")]
    pub bl_config: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
