//! TaskOutput tool (spec §4.9).

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct TaskOutputTool;

#[async_trait::async_trait]
impl Tool for TaskOutputTool {
    fn name(&self) -> &str {
        "TaskOutput"
    }

    fn description(&self) -> &str {
        "Append a new output record for a task, or fetch its last recorded output."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"task_id": {"type": "string"}, "output": {"type": "string"}}})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(task_id) = args
            .get("task_id")
            .or_else(|| args.get("id"))
            .and_then(Value::as_str)
        else {
            return Ok(ToolResult::error("task_id is required"));
        };
        let Some(store) = ctx.store() else {
            return Ok(ToolResult::error("no session store available"));
        };

        if let Some(output) = args.get("output").and_then(Value::as_str) {
            return match store.append_task_record(
                &ctx.session_id,
                &json!({"type": "output", "id": task_id, "output": output}),
            ) {
                Ok(()) => Ok(ToolResult::ok("ok")),
                Err(e) => Ok(ToolResult::error(e.to_string())),
            };
        }

        let records = match store.load_task_records(&ctx.session_id) {
            Ok(r) => r,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        let last_output = records
            .into_iter()
            .rev()
            .filter(|r| r.get("id").and_then(Value::as_str) == Some(task_id))
            .find_map(|r| {
                r.get("output")
                    .and_then(Value::as_str)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
            });

        match last_output {
            Some(output) => Ok(ToolResult::ok(output)),
            None => Ok(ToolResult::error("task output not found")),
        }
    }
}
