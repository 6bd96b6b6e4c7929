//! Read tool (spec §4.5).

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct ReadTool;

const MAX_READ_BYTES: u64 = 1024 * 1024;

#[async_trait::async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "Read"
    }

    fn description(&self) -> &str {
        "Read a file's contents, optionally a line range, from within the sandbox."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string"},
                "path": {"type": "string"},
                "offset": {"type": "integer"},
                "limit": {"type": "integer"}
            }
        })
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(file_path) = args
            .get("file_path")
            .or_else(|| args.get("path"))
            .and_then(Value::as_str)
        else {
            return Ok(ToolResult::error("file_path is required"));
        };

        let resolved = match ctx.sandbox.resolve_path(file_path, true) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        let metadata = match std::fs::metadata(&resolved) {
            Ok(m) => m,
            Err(e) => return Ok(ToolResult::error(format!("stat failed: {e}"))),
        };
        if metadata.len() > MAX_READ_BYTES {
            return Ok(ToolResult::error(format!("file too large: {} bytes", metadata.len())));
        }

        let bytes = match std::fs::read(&resolved) {
            Ok(b) => b,
            Err(e) => return Ok(ToolResult::error(format!("read failed: {e}"))),
        };
        if bytes.contains(&0u8) {
            return Ok(ToolResult::error("binary file detected"));
        }
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let offset = args.get("offset").and_then(Value::as_i64);
        let limit = args.get("limit").and_then(Value::as_i64);

        if offset.is_none() && limit.is_none() {
            return Ok(ToolResult::ok(text));
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let line_count = lines.len() as i64;
        let start = (offset.unwrap_or(1) - 1).max(0);
        if start > line_count {
            return Ok(ToolResult::error("offset exceeds file length"));
        }
        let end = match limit {
            Some(limit) if limit >= 0 => (start + limit).min(line_count),
            _ => line_count,
        };
        let slice = &lines[start as usize..end as usize];
        Ok(ToolResult::ok(slice.join("\n")))
    }
}
