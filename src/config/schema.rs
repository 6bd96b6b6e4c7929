use serde::Deserialize;
use std::path::PathBuf;

use crate::permissions::PermissionMode;

/// The TOML file structure for `toolcore.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub general: Option<GeneralConfig>,
    pub sandbox: Option<SandboxConfig>,
    pub limits: Option<LimitsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub base_dir: Option<String>,
    pub permission_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SandboxConfig {
    pub allowed_roots: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LimitsConfig {
    pub bash_timeout_secs: Option<u64>,
    pub task_max_depth: Option<usize>,
    pub read_max_bytes: Option<u64>,
    pub grep_max_file_bytes: Option<u64>,
    pub bash_output_cap_bytes: Option<usize>,
    pub web_fetch_default_max_bytes: Option<usize>,
    pub websearch_default_url: Option<String>,
}

/// Fully-resolved runtime configuration. All fields have values.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root under which sessions/, projects/, session-env/ live.
    pub base_dir: PathBuf,
    /// Sandbox allow-list; empty means every path is rejected (spec 4.1).
    pub allowed_roots: Vec<PathBuf>,
    pub bash_timeout_secs: u64,
    pub task_max_depth: usize,
    pub read_max_bytes: u64,
    pub grep_max_file_bytes: u64,
    pub bash_output_cap_bytes: usize,
    pub web_fetch_default_max_bytes: usize,
    pub websearch_default_url: String,
    pub permission_mode: PermissionMode,
}

/// Partial config used during merge. All fields are `Option` so that
/// missing fields don't override lower-priority values.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub base_dir: Option<PathBuf>,
    pub allowed_roots: Option<Vec<PathBuf>>,
    pub bash_timeout_secs: Option<u64>,
    pub task_max_depth: Option<usize>,
    pub read_max_bytes: Option<u64>,
    pub grep_max_file_bytes: Option<u64>,
    pub bash_output_cap_bytes: Option<usize>,
    pub web_fetch_default_max_bytes: Option<usize>,
    pub websearch_default_url: Option<String>,
    pub permission_mode: Option<PermissionMode>,
}

impl ConfigFile {
    /// Convert a parsed TOML config file into a `PartialConfig` for merging.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_partial(self) -> PartialConfig {
        let mut partial = PartialConfig::default();

        if let Some(general) = self.general {
            partial.base_dir = general.base_dir.map(PathBuf::from);
            partial.permission_mode = general
                .permission_mode
                .as_deref()
                .and_then(PermissionMode::parse);
        }

        if let Some(sandbox) = self.sandbox {
            partial.allowed_roots = sandbox
                .allowed_roots
                .map(|roots| roots.into_iter().map(PathBuf::from).collect());
        }

        if let Some(limits) = self.limits {
            partial.bash_timeout_secs = limits.bash_timeout_secs;
            partial.task_max_depth = limits.task_max_depth;
            partial.read_max_bytes = limits.read_max_bytes;
            partial.grep_max_file_bytes = limits.grep_max_file_bytes;
            partial.bash_output_cap_bytes = limits.bash_output_cap_bytes;
            partial.web_fetch_default_max_bytes = limits.web_fetch_default_max_bytes;
            partial.websearch_default_url = limits.websearch_default_url;
        }

        partial
    }
}
