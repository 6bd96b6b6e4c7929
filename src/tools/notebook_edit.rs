//! NotebookEdit tool (spec §4.5): same contract as Edit, gated to `.ipynb`.

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::edit::run_edit;
use super::registry::Tool;

pub struct NotebookEditTool;

#[async_trait::async_trait]
impl Tool for NotebookEditTool {
    fn name(&self) -> &str {
        "NotebookEdit"
    }

    fn description(&self) -> &str {
        "Edit a Jupyter notebook (.ipynb) file; delegates to Edit's semantics."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string"},
                "path": {"type": "string"},
                "old_string": {"type": "string"},
                "new_string": {"type": "string"},
                "patch": {"type": "string"},
                "replacements": {"type": "array"}
            }
        })
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let file_path = args
            .get("file_path")
            .or_else(|| args.get("path"))
            .and_then(Value::as_str)
            .unwrap_or("");

        if !file_path.to_ascii_lowercase().ends_with(".ipynb") {
            return Ok(ToolResult::error("NotebookEdit requires a .ipynb file"));
        }

        run_edit(args, ctx).await
    }
}
