//! `ToolContext` / `ToolResult` (spec §3): the per-call bundle every tool
//! receives, and the uniform shape every tool returns.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::sandbox::Sandbox;
use crate::store::Store;
use crate::task::{TaskExecutor, TaskManager};

/// Immutable per-call bundle. Re-created by the orchestrator on every
/// invocation; tools never mutate it.
#[derive(Clone)]
pub struct ToolContext {
    pub sandbox: Arc<Sandbox>,
    pub cwd: PathBuf,
    pub session_id: String,
    pub store: Option<Arc<Store>>,
    pub task_executor: Option<Arc<dyn TaskExecutor>>,
    pub task_manager: Option<Arc<TaskManager>>,
    pub task_depth: usize,
    pub task_max_depth: usize,
    /// Cancellation for this call. Bash propagates it to the child process;
    /// network tools honour it on the in-flight request.
    pub cancel: tokio_util::sync::CancellationToken,
}

impl ToolContext {
    pub fn store(&self) -> Option<&Store> {
        self.store.as_deref()
    }
}

/// `{Content, IsError}`. `is_error` is the tool's business-failure path; the
/// `Result::Err` transport channel is reserved for dispatcher bugs and is
/// never produced by any in-tree tool.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}
