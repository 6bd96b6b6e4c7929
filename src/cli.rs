use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "toolcore", version, about = "Tool execution core for a local coding-agent runtime")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the base directory (default: $HOME/.toolcore)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Add a sandbox allow-list root (repeatable). Replaces config-file roots
    /// when given at least once.
    #[arg(long = "allowed-root", global = true)]
    pub allowed_root: Option<Vec<String>>,

    /// Shell command timeout in seconds
    #[arg(long, global = true)]
    pub bash_timeout: Option<u64>,

    /// Maximum task nesting depth
    #[arg(long, global = true)]
    pub task_max_depth: Option<usize>,

    /// Permission mode: default, acceptEdits, dontAsk, delegate, bypassPermissions, plan
    #[arg(long, global = true)]
    pub permission_mode: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Invoke a single tool directly, bypassing any orchestrator.
    RunTool {
        /// Session id to record this invocation under.
        #[arg(long)]
        session: String,
        /// Registered tool name.
        #[arg(long)]
        name: String,
        /// JSON-encoded tool arguments.
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Inspect persisted sessions.
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// List known sessions, most recently modified first.
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print every event recorded for a session.
    Show { session: String },
}
