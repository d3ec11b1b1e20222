//! Synthesize a clean CLI config from the runtime's own config file.
//!
//! The loader ships a `BatchLoaderConfig.xml` mixing UI state with the
//! settings the command-line tool needs. `init-config` copies just the
//! scalar fields the CLI reads, in a fixed order, and records the runtime
//! folder as `<loader_dir>`.

use std::path::{Path, PathBuf};

use batchload_common::{Document, Element, read_document};
use tracing::info;

use crate::error::{ConfigError, Result};

/// File name of the config shipped inside the runtime folder.
pub const RUNTIME_CONFIG_NAME: &str = "BatchLoaderConfig.xml";

/// Default file name of the CLI config.
pub const DEFAULT_CLI_CONFIG_NAME: &str = "CLIBatchLoaderConfig.xml";

/// Root element of a generated CLI config.
pub const CLI_CONFIG_ROOT: &str = "BatchLoaderConfig";

/// Passthrough fields copied verbatim, in output order.
pub const CLI_CONFIG_FIELDS: [&str; 12] = [
    "server",
    "db",
    "user",
    "password",
    "max_processes",
    "delimiter",
    "threads",
    "encoding",
    "lines_per_process",
    "first_row",
    "log_level",
    "log_file",
];

const LOADER_DIR_COMMENT: &str =
    " Runtime folder used by the CLI script (absolute or relative to this file) ";

/// Resolves where `init-config` writes: an existing directory gets the
/// default file name appended; no argument means the current directory.
pub fn resolve_init_target(requested: Option<&Path>) -> PathBuf {
    let target = requested
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".").join(DEFAULT_CLI_CONFIG_NAME));
    if target.is_dir() {
        target.join(DEFAULT_CLI_CONFIG_NAME)
    } else {
        target
    }
}

/// Picks the first non-empty trimmed text among the root's `tag` children,
/// else the first child's trimmed text, else an empty string.
fn pick_first_text(root: &Element, tag: &str) -> String {
    let mut first: Option<String> = None;
    for element in root.find_children(tag) {
        let text = element.text().trim().to_string();
        if !text.is_empty() {
            return text;
        }
        first.get_or_insert(text);
    }
    first.unwrap_or_default()
}

/// Builds a CLI config document from the runtime config at `runtime_config`.
pub fn build_cli_config_from_runtime(runtime_config: &Path, loader_dir: &Path) -> Result<Document> {
    if !runtime_config.is_file() {
        return Err(ConfigError::RuntimeConfigNotFound {
            path: runtime_config.to_path_buf(),
        });
    }
    let source = read_document(runtime_config).map_err(|source| ConfigError::Parse {
        path: runtime_config.to_path_buf(),
        source,
    })?;

    let mut root = Element::new(CLI_CONFIG_ROOT);
    for field in CLI_CONFIG_FIELDS {
        root = root.with_child(Element::new(field).with_text(pick_first_text(source.root(), field)));
    }
    root = root
        .with_comment(LOADER_DIR_COMMENT)
        .with_child(Element::new("loader_dir").with_text(loader_dir.display().to_string()));
    Ok(Document::new(root))
}

/// Writes a CLI config with tab indentation, overwriting `target`.
pub fn write_cli_config(config: &Document, target: &Path) -> Result<()> {
    config
        .write_pretty(target, b'\t')
        .map_err(|source| ConfigError::Write {
            path: target.to_path_buf(),
            source,
        })?;
    info!(target = %target.display(), "wrote CLI config");
    Ok(())
}
