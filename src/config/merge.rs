use super::schema::{AppConfig, PartialConfig};
use crate::permissions::PermissionMode;
use std::path::PathBuf;

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            base_dir: self.base_dir.or(fallback.base_dir),
            allowed_roots: self.allowed_roots.or(fallback.allowed_roots),
            bash_timeout_secs: self.bash_timeout_secs.or(fallback.bash_timeout_secs),
            task_max_depth: self.task_max_depth.or(fallback.task_max_depth),
            read_max_bytes: self.read_max_bytes.or(fallback.read_max_bytes),
            grep_max_file_bytes: self.grep_max_file_bytes.or(fallback.grep_max_file_bytes),
            bash_output_cap_bytes: self
                .bash_output_cap_bytes
                .or(fallback.bash_output_cap_bytes),
            web_fetch_default_max_bytes: self
                .web_fetch_default_max_bytes
                .or(fallback.web_fetch_default_max_bytes),
            websearch_default_url: self
                .websearch_default_url
                .or(fallback.websearch_default_url),
            permission_mode: self.permission_mode.or(fallback.permission_mode),
        }
    }

    /// Convert to `AppConfig`, filling any remaining gaps with defaults.
    pub fn finalize(self) -> AppConfig {
        let base_dir = self.base_dir.unwrap_or_else(default_base_dir);
        let allowed_roots = self
            .allowed_roots
            .unwrap_or_else(|| vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]);

        AppConfig {
            base_dir,
            allowed_roots,
            bash_timeout_secs: self.bash_timeout_secs.unwrap_or(120),
            task_max_depth: self.task_max_depth.unwrap_or(8),
            read_max_bytes: self.read_max_bytes.unwrap_or(1024 * 1024),
            grep_max_file_bytes: self.grep_max_file_bytes.unwrap_or(1024 * 1024),
            bash_output_cap_bytes: self.bash_output_cap_bytes.unwrap_or(64 * 1024),
            web_fetch_default_max_bytes: self
                .web_fetch_default_max_bytes
                .unwrap_or(1024 * 1024),
            websearch_default_url: self
                .websearch_default_url
                .unwrap_or_else(|| "https://html.duckduckgo.com/html/".to_string()),
            permission_mode: self.permission_mode.unwrap_or(PermissionMode::Default),
        }
    }
}

/// `$HOME/.openclaude`, matching the filesystem layout's default base dir.
fn default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".openclaude"))
        .unwrap_or_else(|| PathBuf::from(".openclaude"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_workspace() {
        let cli = PartialConfig {
            bash_timeout_secs: Some(60),
            ..Default::default()
        };
        let workspace = PartialConfig {
            bash_timeout_secs: Some(10),
            task_max_depth: Some(3),
            ..Default::default()
        };

        let merged = cli.with_fallback(workspace);
        assert_eq!(merged.bash_timeout_secs, Some(60));
        assert_eq!(merged.task_max_depth, Some(3));
    }

    #[test]
    fn defaults_apply_when_no_config() {
        let config = PartialConfig::default().finalize();

        assert_eq!(config.bash_timeout_secs, 120);
        assert_eq!(config.task_max_depth, 8);
        assert_eq!(config.read_max_bytes, 1024 * 1024);
        assert_eq!(config.grep_max_file_bytes, 1024 * 1024);
        assert_eq!(config.bash_output_cap_bytes, 64 * 1024);
        assert_eq!(config.permission_mode, PermissionMode::Default);
        assert!(!config.allowed_roots.is_empty());
    }

    #[test]
    fn allowed_roots_replace_not_merge() {
        let workspace = PartialConfig {
            allowed_roots: Some(vec![PathBuf::from("/workspace")]),
            ..Default::default()
        };
        let global = PartialConfig {
            allowed_roots: Some(vec![PathBuf::from("/a"), PathBuf::from("/b")]),
            ..Default::default()
        };

        let merged = workspace.with_fallback(global);
        assert_eq!(merged.allowed_roots, Some(vec![PathBuf::from("/workspace")]));
    }

    #[test]
    fn three_layer_merge() {
        let cli = PartialConfig {
            bash_timeout_secs: Some(5),
            ..Default::default()
        };
        let workspace = PartialConfig {
            task_max_depth: Some(2),
            ..Default::default()
        };
        let global = PartialConfig {
            bash_timeout_secs: Some(999),
            task_max_depth: Some(999),
            ..Default::default()
        };

        let config = cli.with_fallback(workspace).with_fallback(global).finalize();
        assert_eq!(config.bash_timeout_secs, 5);
        assert_eq!(config.task_max_depth, 2);
    }
}
