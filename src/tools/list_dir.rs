//! ListDir tool (spec §4.5).

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct ListDirTool;

#[async_trait::async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &str {
        "ListDir"
    }

    fn description(&self) -> &str {
        "List entries of a directory within the sandbox, classified by kind."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(path_input) = args.get("path").and_then(Value::as_str) else {
            return Ok(ToolResult::error("path is required"));
        };
        let resolved = match ctx.sandbox.resolve_path(path_input, true) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        let entries = match std::fs::read_dir(&resolved) {
            Ok(e) => e,
            Err(e) => return Ok(ToolResult::error(format!("read_dir failed: {e}"))),
        };

        let mut rows: Vec<(String, String)> = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else { continue };
            let kind = if metadata.is_symlink() {
                "symlink"
            } else if metadata.is_dir() {
                "dir"
            } else {
                "file"
            };
            let size = metadata.len();
            let full = path.to_string_lossy().into_owned();
            rows.push((full.clone(), format!("{kind} {size}\t{full}\n")));
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(ToolResult::ok(rows.into_iter().map(|(_, line)| line).collect()))
    }
}
