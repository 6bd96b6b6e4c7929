//! Glob tool (spec §4.5).

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct GlobTool;

#[async_trait::async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &str {
        "Glob"
    }

    fn description(&self) -> &str {
        "Expand a shell-style glob pattern and return sandbox-contained matches, sorted."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"pattern": {"type": "string"}}, "required": ["pattern"]})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(pattern) = args.get("pattern").and_then(Value::as_str) else {
            return Ok(ToolResult::error("pattern is required"));
        };

        let mut matches: Vec<String> = Vec::new();
        let entries = match glob::glob(pattern) {
            Ok(e) => e,
            Err(e) => return Ok(ToolResult::error(format!("invalid pattern: {e}"))),
        };

        for entry in entries.flatten() {
            let Some(path_str) = entry.to_str() else { continue };
            if let Ok(resolved) = ctx.sandbox.resolve_path(path_str, true) {
                matches.push(resolved.to_string_lossy().into_owned());
            }
        }
        matches.sort();
        Ok(ToolResult::ok(matches.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn matches_sorted_and_contained() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("b.txt"), "").unwrap();
        std::fs::write(tmp.path().join("a.txt"), "").unwrap();
        let ctx = ToolContext {
            sandbox: Arc::new(Sandbox::new(vec![tmp.path().to_path_buf()])),
            cwd: tmp.path().to_path_buf(),
            session_id: "s1".to_string(),
            store: None,
            task_executor: None,
            task_manager: None,
            task_depth: 0,
            task_max_depth: 8,
        cancel: tokio_util::sync::CancellationToken::new(),
        };
        let pattern = tmp.path().join("*.txt");
        let result = GlobTool
            .run(json!({"pattern": pattern.to_str().unwrap()}), &ctx)
            .await
            .unwrap();
        let lines: Vec<&str> = result.content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0] < lines[1]);
    }
}
