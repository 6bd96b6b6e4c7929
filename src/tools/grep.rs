//! Grep tool (spec §4.5): recursive substring search, best-effort.

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

const MAX_GREP_FILE_BYTES: u64 = 1024 * 1024;

pub struct GrepTool;

#[async_trait::async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str {
        "Grep"
    }

    fn description(&self) -> &str {
        "Recursively search files under a path for a substring."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"query": {"type": "string"}, "path": {"type": "string"}},
            "required": ["query"]
        })
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(query) = args.get("query").and_then(Value::as_str) else {
            return Ok(ToolResult::error("query is required"));
        };
        let path_input = args
            .get("path")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| ctx.cwd.to_string_lossy().into_owned());

        let root = match ctx.sandbox.resolve_path(&path_input, true) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        let mut matches = Vec::new();
        walk(&root, query, &mut matches);
        Ok(ToolResult::ok(matches.join("\n")))
    }
}

fn walk(dir: &std::path::Path, query: &str, matches: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else { continue };
        if metadata.is_dir() {
            walk(&path, query, matches);
        } else if metadata.is_file() && metadata.len() <= MAX_GREP_FILE_BYTES {
            scan_file(&path, query, matches);
        }
    }
}

fn scan_file(path: &std::path::Path, query: &str, matches: &mut Vec<String>) {
    let Ok(text) = std::fs::read_to_string(path) else { return };
    for (idx, line) in text.lines().enumerate() {
        if line.contains(query) {
            matches.push(format!("{}:{}:{}", path.display(), idx + 1, line));
        }
    }
}
