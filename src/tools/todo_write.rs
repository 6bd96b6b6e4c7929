//! TodoWrite tool (spec §4.8).

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct TodoWriteTool;

#[async_trait::async_trait]
impl Tool for TodoWriteTool {
    fn name(&self) -> &str {
        "TodoWrite"
    }

    fn description(&self) -> &str {
        "Persist the current todo list for this session."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"todos": {"type": "array"}}, "required": ["todos"]})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(todos) = args.get("todos") else {
            return Ok(ToolResult::error("todos is required"));
        };

        let mut persisted = false;
        let mut path_str = None;
        if !ctx.session_id.is_empty() {
            if let Some(store) = ctx.store() {
                match store.save_todos(&ctx.session_id, todos) {
                    Ok(path) => {
                        persisted = true;
                        path_str = Some(path.to_string_lossy().into_owned());
                    }
                    Err(e) => return Ok(ToolResult::error(format!("failed to persist todos: {e}"))),
                }
            }
        }

        let mut response = json!({"status": "ok", "persisted": persisted, "todos": todos});
        if let Some(path) = path_str {
            response["path"] = json!(path);
        }
        Ok(ToolResult::ok(response.to_string()))
    }
}
