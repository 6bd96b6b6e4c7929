//! Write tool (spec §4.5).

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;
use crate::fsutil::write_atomic;

#[cfg(unix)]
fn mode_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}

pub struct WriteTool;

#[async_trait::async_trait]
impl Tool for WriteTool {
    fn name(&self) -> &str {
        "Write"
    }

    fn description(&self) -> &str {
        "Write (create or overwrite) a file within the sandbox."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string"},
                "path": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["content"]
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
        let Some(content) = args.get("content").and_then(Value::as_str) else {
            return Ok(ToolResult::error("content is required"));
        };

        let resolved = match ctx.sandbox.resolve_path(file_path, false) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        let parent = resolved.parent().unwrap_or_else(|| std::path::Path::new("."));
        if let Err(e) = std::fs::create_dir_all(parent) {
            return Ok(ToolResult::error(format!("mkdir failed: {e}")));
        }

        let mut mode = 0o644u32;
        if let Ok(metadata) = std::fs::metadata(&resolved) {
            if metadata.is_dir() {
                return Ok(ToolResult::error(format!("{} is a directory", resolved.display())));
            }
            mode = mode_bits(&metadata);
            if let Some(store) = ctx.store() {
                if let Err(e) = store.backup_file(&ctx.session_id, &resolved) {
                    return Ok(ToolResult::error(format!("backup failed: {e}")));
                }
            }
        }

        if let Err(e) = write_atomic(&resolved, content.as_bytes(), mode) {
            return Ok(ToolResult::error(format!("write failed: {e}")));
        }

        Ok(ToolResult::ok("ok"))
    }
}
