//! Settings for the batch loader driver.
//!
//! The loader reads an XML settings document with one scalar element per
//! setting. This crate pulls out the few values the driver itself needs
//! (runtime folder, header row, delimiter) and can synthesize a clean CLI
//! config from the runtime's own, richer config file.

pub mod delimiter;
pub mod error;
pub mod init;
pub mod settings;

pub use delimiter::{DEFAULT_DELIMITER, normalize_delimiter};
pub use error::{ConfigError, Result};
pub use init::{
    CLI_CONFIG_FIELDS, CLI_CONFIG_ROOT, DEFAULT_CLI_CONFIG_NAME, RUNTIME_CONFIG_NAME,
    build_cli_config_from_runtime, resolve_init_target, write_cli_config,
};
pub use settings::{
    Settings, read_delimiter, read_first_row, read_loader_dir, read_setting,
};
