//! Error types for the tool execution core.
//!
//! Three domains, following one `thiserror` enum per concern: configuration,
//! sandbox path resolution, and session/project store I/O. None of these are
//! used as the dispatcher's transport-error channel (see `tools::ToolResult`)
//! -- every tool converts its own failures into a business-error `ToolResult`
//! before returning.

use std::path::PathBuf;

/// Errors related to configuration loading, parsing, and merging.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors returned by `Sandbox::resolve_path`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SandboxError {
    #[error("path '{0}' is outside the sandbox")]
    OutOfSandbox(PathBuf),

    #[error("path '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("failed to stat '{path}': {message}")]
    StatError { path: PathBuf, message: String },
}

/// Errors returned by the session/project `Store`.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session id must not be empty")]
    EmptySessionId,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("session '{0}' not found")]
    SessionNotFound(String),
}
