pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::Cli;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Load configuration by merging CLI, workspace, and global sources.
/// Precedence: CLI > workspace config (`./toolcore.toml`) > global config
/// (`<base_dir>/config.toml`) > defaults.
pub fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let cli_partial = cli.to_partial();

    let workspace_partial = load_config_file(Path::new("toolcore.toml"))?.unwrap_or_default();

    // The global config's location depends on base_dir, which itself may be
    // set by CLI or workspace config, so resolve it before reading globally.
    let provisional_base_dir = cli_partial
        .base_dir
        .clone()
        .or_else(|| workspace_partial.base_dir.clone());

    let global_partial = match provisional_base_dir {
        Some(ref dir) => load_config_file(&dir.join("config.toml"))?.unwrap_or_default(),
        None => PartialConfig::default(),
    };

    Ok(cli_partial
        .with_fallback(workspace_partial)
        .with_fallback(global_partial)
        .finalize())
}

fn load_config_file(path: &Path) -> Result<Option<PartialConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(Some(parsed.to_partial()))
}

impl Cli {
    /// Extract CLI overrides into a `PartialConfig`.
    pub fn to_partial(&self) -> PartialConfig {
        PartialConfig {
            base_dir: self.base_dir.clone(),
            allowed_roots: self
                .allowed_root
                .as_ref()
                .map(|roots| roots.iter().map(PathBuf::from).collect()),
            bash_timeout_secs: self.bash_timeout,
            task_max_depth: self.task_max_depth,
            read_max_bytes: None,
            grep_max_file_bytes: None,
            bash_output_cap_bytes: None,
            web_fetch_default_max_bytes: None,
            websearch_default_url: None,
            permission_mode: self
                .permission_mode
                .as_deref()
                .and_then(crate::permissions::PermissionMode::parse),
        }
    }
}
