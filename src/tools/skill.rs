//! Skill tool (spec §4.5): look up a named skill doc by convention path.

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct SkillTool;

#[async_trait::async_trait]
impl Tool for SkillTool {
    fn name(&self) -> &str {
        "Skill"
    }

    fn description(&self) -> &str {
        "Load a skill document by name or explicit path."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"name": {"type": "string"}, "path": {"type": "string"}}})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let candidates: Vec<String> = if let Some(path) = args.get("path").and_then(Value::as_str) {
            vec![path.to_string()]
        } else if let Some(name) = args.get("name").and_then(Value::as_str) {
            vec![
                ctx.cwd
                    .join(".openclaude/skills")
                    .join(name)
                    .join("SKILL.md")
                    .to_string_lossy()
                    .into_owned(),
                ctx.cwd
                    .join(".openclaude/skills")
                    .join(format!("{name}.md"))
                    .to_string_lossy()
                    .into_owned(),
                ctx.cwd
                    .join("skills")
                    .join(name)
                    .join("SKILL.md")
                    .to_string_lossy()
                    .into_owned(),
                ctx.cwd
                    .join("skills")
                    .join(format!("{name}.md"))
                    .to_string_lossy()
                    .into_owned(),
            ]
        } else {
            return Ok(ToolResult::error("name or path is required"));
        };

        for candidate in candidates {
            let Ok(resolved) = ctx.sandbox.resolve_path(&candidate, true) else {
                continue;
            };
            if let Ok(text) = std::fs::read_to_string(&resolved) {
                return Ok(ToolResult::ok(text));
            }
        }
        Ok(ToolResult::error("skill not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ctx(tmp: &TempDir) -> ToolContext {
        ToolContext {
            sandbox: Arc::new(Sandbox::new(vec![tmp.path().to_path_buf()])),
            cwd: tmp.path().to_path_buf(),
            session_id: "s1".to_string(),
            store: None,
            task_executor: None,
            task_manager: None,
            task_depth: 0,
            task_max_depth: 8,
        cancel: tokio_util::sync::CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn finds_skill_by_name_first_candidate() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join(".openclaude/skills/deploy");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), "deploy steps").unwrap();
        let result = SkillTool.run(json!({"name": "deploy"}), &ctx(&tmp)).await.unwrap();
        assert_eq!(result.content, "deploy steps");
    }

    #[tokio::test]
    async fn missing_skill_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = SkillTool.run(json!({"name": "nope"}), &ctx(&tmp)).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.content, "skill not found");
    }
}
