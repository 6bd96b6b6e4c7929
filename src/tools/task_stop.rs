//! TaskStop tool (spec §4.9).

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct TaskStopTool;

#[async_trait::async_trait]
impl Tool for TaskStopTool {
    fn name(&self) -> &str {
        "TaskStop"
    }

    fn description(&self) -> &str {
        "Cancel a running task."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"task_id": {"type": "string"}}, "required": ["task_id"]})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(task_id) = args
            .get("task_id")
            .or_else(|| args.get("id"))
            .and_then(Value::as_str)
        else {
            return Ok(ToolResult::error("task_id is required"));
        };
        let Some(task_manager) = &ctx.task_manager else {
            return Ok(ToolResult::error("no TaskManager configured"));
        };

        let fired = task_manager.cancel(task_id);

        if let Some(store) = ctx.store() {
            let _ = store.append_task_record(
                &ctx.session_id,
                &json!({"type": "stop", "id": task_id, "status": "stopped"}),
            );
        }

        Ok(ToolResult::ok(if fired { "cancelled" } else { "ok" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use crate::store::Store;
    use crate::task::TaskManager;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio_util::sync::CancellationToken;

    fn ctx(tmp: &TempDir, base: &TempDir, manager: Arc<TaskManager>) -> ToolContext {
        ToolContext {
            sandbox: Arc::new(Sandbox::new(vec![tmp.path().to_path_buf()])),
            cwd: tmp.path().to_path_buf(),
            session_id: "s1".to_string(),
            store: Some(Arc::new(Store::new(base.path().to_path_buf()))),
            task_executor: None,
            task_manager: Some(manager),
            task_depth: 0,
            task_max_depth: 8,
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn cancels_registered_task() {
        let tmp = TempDir::new().unwrap();
        let base = TempDir::new().unwrap();
        let manager = Arc::new(TaskManager::new());
        manager.register("t1", CancellationToken::new());
        let c = ctx(&tmp, &base, manager);
        let result = TaskStopTool.run(json!({"task_id": "t1"}), &c).await.unwrap();
        assert_eq!(result.content, "cancelled");
    }

    #[tokio::test]
    async fn stopping_unknown_task_returns_ok() {
        let tmp = TempDir::new().unwrap();
        let base = TempDir::new().unwrap();
        let manager = Arc::new(TaskManager::new());
        let c = ctx(&tmp, &base, manager);
        let result = TaskStopTool.run(json!({"task_id": "unknown"}), &c).await.unwrap();
        assert_eq!(result.content, "ok");
    }

    #[tokio::test]
    async fn always_records_stop_event() {
        let tmp = TempDir::new().unwrap();
        let base = TempDir::new().unwrap();
        let manager = Arc::new(TaskManager::new());
        let c = ctx(&tmp, &base, manager);
        TaskStopTool.run(json!({"task_id": "t1"}), &c).await.unwrap();
        let records = c.store().unwrap().load_task_records("s1").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["type"], "stop");
    }
}
