//! AskUserQuestion tool (spec §4.7).

use std::io::{IsTerminal, Write};

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct AskUserQuestionTool;

#[async_trait::async_trait]
impl Tool for AskUserQuestionTool {
    fn name(&self) -> &str {
        "AskUserQuestion"
    }

    fn description(&self) -> &str {
        "Ask the developer a clarifying question and return their answer."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"question": {"type": "string"}}})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        if let Ok(answer) = std::env::var("OPENCLOUDE_ASK_RESPONSE") {
            if !answer.is_empty() {
                return Ok(ToolResult::ok(answer));
            }
        }

        if !std::io::stdin().is_terminal() {
            return Ok(ToolResult::error("no interactive TTY"));
        }

        let question = args.get("question").and_then(Value::as_str).unwrap_or("").to_string();
        let cancel = ctx.cancel.clone();
        tokio::select! {
            result = tokio::task::spawn_blocking(move || prompt_stdin(&question)) => {
                match result {
                    Ok(answer) => Ok(ToolResult::ok(answer)),
                    Err(e) => Ok(ToolResult::error(format!("prompt failed: {e}"))),
                }
            }
            _ = cancel.cancelled() => Ok(ToolResult::error("cancelled")),
        }
    }
}

fn prompt_stdin(question: &str) -> String {
    if !question.is_empty() {
        print!("{question} ");
        let _ = std::io::stdout().flush();
    }
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    line.trim_end_matches(['\n', '\r']).to_string()
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
    async fn env_override_returns_verbatim() {
        let tmp = TempDir::new().unwrap();
        // SAFETY: test-only, single-threaded within this test's scope.
        unsafe { std::env::set_var("OPENCLOUDE_ASK_RESPONSE", "42") };
        let result = AskUserQuestionTool
            .run(json!({"question": "how many?"}), &ctx(&tmp))
            .await
            .unwrap();
        unsafe { std::env::remove_var("OPENCLOUDE_ASK_RESPONSE") };
        assert_eq!(result.content, "42");
        assert!(!result.is_error);
    }
}
