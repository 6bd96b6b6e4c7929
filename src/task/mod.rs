//! Task subsystem (spec §4.9): nested, cancellable sub-runs, executed by an
//! externally-supplied [`TaskExecutor`] and tracked through [`TaskManager`]
//! plus the per-session `tasks.jsonl` record trail.

pub mod manager;
pub mod types;

pub use manager::TaskManager;
pub use types::{Message, TaskRequest, TaskResult};

/// Implemented externally by a loop that drives the LLM with the request's
/// model/system prompt/messages for up to `max_turns` and returns the final
/// assistant text. Opaque to this crate beyond that contract.
#[async_trait::async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute_task(
        &self,
        cancel: tokio_util::sync::CancellationToken,
        request: TaskRequest,
    ) -> anyhow::Result<TaskResult>;
}
