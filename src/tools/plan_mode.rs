//! EnterPlanMode / ExitPlanMode tools (spec §4.8): zero-argument marker
//! toggles.

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

pub struct EnterPlanModeTool;
pub struct ExitPlanModeTool;

#[async_trait::async_trait]
impl Tool for EnterPlanModeTool {
    fn name(&self) -> &str {
        "EnterPlanMode"
    }

    fn description(&self) -> &str {
        "Enable plan mode for this session."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn run(&self, _args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        set_plan_mode(ctx, true)
    }
}

#[async_trait::async_trait]
impl Tool for ExitPlanModeTool {
    fn name(&self) -> &str {
        "ExitPlanMode"
    }

    fn description(&self) -> &str {
        "Disable plan mode for this session."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn run(&self, _args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        set_plan_mode(ctx, false)
    }
}

fn set_plan_mode(ctx: &ToolContext, enabled: bool) -> anyhow::Result<ToolResult> {
    let Some(store) = ctx.store() else {
        return Ok(ToolResult::error("no session store available"));
    };
    match store.set_plan_mode(&ctx.session_id, enabled) {
        Ok(()) => Ok(ToolResult::ok("ok")),
        Err(e) => Ok(ToolResult::error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Sandbox;
    use crate::store::Store;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn ctx(tmp: &TempDir, base: &TempDir) -> ToolContext {
        ToolContext {
            sandbox: Arc::new(Sandbox::new(vec![tmp.path().to_path_buf()])),
            cwd: tmp.path().to_path_buf(),
            session_id: "s1".to_string(),
            store: Some(Arc::new(Store::new(base.path().to_path_buf()))),
            task_executor: None,
            task_manager: None,
            task_depth: 0,
            task_max_depth: 8,
            cancel: tokio_util::sync::CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn enter_then_exit_plan_mode() {
        let tmp = TempDir::new().unwrap();
        let base = TempDir::new().unwrap();
        let c = ctx(&tmp, &base);
        EnterPlanModeTool.run(json!({}), &c).await.unwrap();
        assert!(c.store().unwrap().is_plan_mode("s1"));
        ExitPlanModeTool.run(json!({}), &c).await.unwrap();
        assert!(!c.store().unwrap().is_plan_mode("s1"));
    }
}
