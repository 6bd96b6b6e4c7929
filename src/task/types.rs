//! Shared vocabulary for the task subsystem (spec §4.9).

use serde::{Deserialize, Serialize};

/// A chat-style message round-tripped through JSON into the executor's
/// request. Shape is deliberately minimal -- the LLM client itself is
/// opaque to this crate.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Request handed to an external `TaskExecutor`.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TaskRequest {
    pub prompt: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_turns: Option<u64>,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Caller-supplied passthrough, carried unread into the response.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Outcome of a completed task run.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TaskResult {
    pub output: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
