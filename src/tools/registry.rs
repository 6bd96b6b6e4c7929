//! Tool trait and registry/dispatcher (spec §4.4).

use std::collections::HashMap;
use std::sync::Arc;

use super::context::{ToolContext, ToolResult};

/// A single invocable capability. `run` never returns `Err` in-tree;
/// business failures are signalled through `ToolResult::is_error`.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> serde_json::Value;
    async fn run(&self, args: serde_json::Value, ctx: &ToolContext) -> anyhow::Result<ToolResult>;
}

/// `{map: name -> tool, order: [name]}`. First registration wins on
/// duplicate name; insertion order is preserved for deterministic
/// `tool_specs()` output.
pub struct Runner {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl Runner {
    /// Build a runner from a tool list. `None` entries and blank names are
    /// skipped; duplicate names keep the first registration.
    pub fn new(tools: Vec<Option<Arc<dyn Tool>>>) -> Self {
        let mut map = HashMap::new();
        let mut order = Vec::new();
        for tool in tools.into_iter().flatten() {
            let name = tool.name().to_string();
            if name.is_empty() {
                continue;
            }
            if map.contains_key(&name) {
                continue;
            }
            order.push(name.clone());
            map.insert(name, tool);
        }
        Self { tools: map, order }
    }

    /// Deterministic list of registered tool names. Falls back to sorted
    /// order if the explicit registration order is empty.
    pub fn tool_specs(&self) -> Vec<(String, serde_json::Value)> {
        let names: Vec<&String> = if self.order.is_empty() {
            let mut sorted: Vec<&String> = self.tools.keys().collect();
            sorted.sort();
            sorted
        } else {
            self.order.iter().collect()
        };
        names
            .into_iter()
            .filter_map(|n| self.tools.get(n).map(|t| (n.clone(), t.schema())))
            .collect()
    }

    pub async fn run(&self, name: &str, args: serde_json::Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        match self.tools.get(name) {
            Some(tool) => tool.run(args, ctx).await,
            None => Ok(ToolResult::error(format!("tool not found: {name}"))),
        }
    }
}

/// Intersect `tools` with `allowed` (if non-empty) then subtract
/// `disallowed`. Blank names in either filter list are ignored. An empty
/// result is an error.
pub fn filter_tools(
    tools: Vec<Arc<dyn Tool>>,
    allowed: &[String],
    disallowed: &[String],
) -> anyhow::Result<Vec<Arc<dyn Tool>>> {
    let allowed: Vec<&str> = allowed.iter().map(String::as_str).filter(|s| !s.is_empty()).collect();
    let disallowed: Vec<&str> = disallowed
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();

    let filtered: Vec<Arc<dyn Tool>> = tools
        .into_iter()
        .filter(|t| allowed.is_empty() || allowed.contains(&t.name()))
        .filter(|t| !disallowed.contains(&t.name()))
        .collect();

    if filtered.is_empty() {
        anyhow::bail!("no tools remaining after filtering");
    }
    Ok(filtered)
}

/// Fixed ordered catalog (spec §4.4). This order is a testable property.
pub const DEFAULT_TOOL_ORDER: [&str; 17] = [
    "Task",
    "TaskOutput",
    "Bash",
    "Glob",
    "Grep",
    "ExitPlanMode",
    "Read",
    "Edit",
    "Write",
    "NotebookEdit",
    "WebFetch",
    "TodoWrite",
    "WebSearch",
    "TaskStop",
    "AskUserQuestion",
    "Skill",
    "EnterPlanMode",
];
