//! Individual tool implementations, the `Tool` trait, and the dispatcher
//! registry (spec §4.4-4.9).

pub mod ask_user_question;
pub mod bash;
pub mod context;
pub mod edit;
pub mod glob;
pub mod grep;
pub mod list_dir;
pub mod notebook_edit;
pub mod plan_mode;
pub mod read;
pub mod registry;
pub mod skill;
pub mod task;
pub mod task_output;
pub mod task_stop;
pub mod todo_write;
pub mod web_fetch;
pub mod web_search;
pub mod write;

pub use context::{ToolContext, ToolResult};
pub use registry::{filter_tools, Runner, Tool, DEFAULT_TOOL_ORDER};

use std::sync::Arc;

/// The fixed ordered catalog named in spec §4.4, built fresh each call.
pub fn default_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(task::TaskTool),
        Arc::new(task_output::TaskOutputTool),
        Arc::new(bash::BashTool),
        Arc::new(glob::GlobTool),
        Arc::new(grep::GrepTool),
        Arc::new(plan_mode::ExitPlanModeTool),
        Arc::new(read::ReadTool),
        Arc::new(edit::EditTool),
        Arc::new(write::WriteTool),
        Arc::new(notebook_edit::NotebookEditTool),
        Arc::new(web_fetch::WebFetchTool),
        Arc::new(todo_write::TodoWriteTool),
        Arc::new(web_search::WebSearchTool),
        Arc::new(task_stop::TaskStopTool),
        Arc::new(ask_user_question::AskUserQuestionTool),
        Arc::new(skill::SkillTool),
        Arc::new(plan_mode::EnterPlanModeTool),
    ]
}
