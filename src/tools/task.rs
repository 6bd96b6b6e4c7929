//! Task tool (spec §4.9): the hardest subcomponent. Spawns a nested agent
//! run, synchronously or as a detached background worker.

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;
use crate::task::{Message, TaskRequest};

const PROMPT_KEYS: [&str; 7] = ["prompt", "task", "title", "description", "instructions", "input", "message"];
const ASYNC_KEYS: [&str; 4] = ["async", "background", "detached", "run_in_background"];

pub struct TaskTool;

#[async_trait::async_trait]
impl Tool for TaskTool {
    fn name(&self) -> &str {
        "Task"
    }

    fn description(&self) -> &str {
        "Spawn a nested agent run, synchronously or in the background."
    }

    fn schema(&self) -> Value {
        json!({"type": "object", "properties": {"prompt": {"type": "string"}}})
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(executor) = ctx.task_executor.clone() else {
            return Ok(ToolResult::error("no TaskExecutor configured"));
        };

        if ctx.task_max_depth > 0 && ctx.task_depth >= ctx.task_max_depth {
            return Ok(ToolResult::error("task nesting limit reached"));
        }

        let mut payload = args.clone();
        let task_id = payload
            .get("task_id")
            .or_else(|| payload.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        if let Some(map) = payload.as_object_mut() {
            map.insert("task_id".to_string(), json!(task_id));
        }

        let Some(store) = ctx.store() else {
            return Ok(ToolResult::error("no session store available"));
        };

        let _ = store.append_task_record(
            &ctx.session_id,
            &json!({"type": "task", "id": task_id, "status": "created", "payload": payload}),
        );

        let request = match build_request(&payload) {
            Ok(r) => r,
            Err(e) => return Ok(ToolResult::error(e)),
        };

        let is_async = ASYNC_KEYS
            .iter()
            .any(|key| payload.get(*key).and_then(Value::as_bool) == Some(true));

        if !is_async {
            return run_sync(store, &ctx.session_id, &task_id, executor, request).await;
        }

        run_async(ctx, &task_id, executor, request)
    }
}

fn build_request(payload: &Value) -> Result<TaskRequest, String> {
    let prompt = PROMPT_KEYS
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .unwrap_or("")
        .to_string();

    let messages: Vec<Message> = payload
        .get("messages")
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    if messages.is_empty() && prompt.trim().is_empty() {
        return Err("task prompt is required".to_string());
    }

    let metadata = payload.get("metadata").cloned();

    Ok(TaskRequest {
        prompt,
        system_prompt: payload
            .get("system_prompt")
            .or_else(|| payload.get("systemPrompt"))
            .and_then(Value::as_str)
            .map(str::to_string),
        model: payload.get("model").and_then(Value::as_str).map(str::to_string),
        max_turns: payload.get("max_turns").and_then(Value::as_u64),
        messages,
        metadata,
    })
}

async fn run_sync(
    store: &crate::store::Store,
    session_id: &str,
    task_id: &str,
    executor: std::sync::Arc<dyn crate::task::TaskExecutor>,
    request: TaskRequest,
) -> anyhow::Result<ToolResult> {
    let request_metadata = request.metadata.clone();
    let cancel = CancellationToken::new();
    match executor.execute_task(cancel, request).await {
        Ok(result) => {
            let metadata = result.metadata.or(request_metadata).unwrap_or(Value::Null);
            let _ = store.append_task_record(
                session_id,
                &json!({"type": "output", "id": task_id, "status": "completed", "output": result.output, "metadata": metadata}),
            );
            Ok(ToolResult::ok(
                json!({"id": task_id, "status": "completed", "result": result.output, "metadata": metadata}).to_string(),
            ))
        }
        Err(e) => {
            let metadata = request_metadata.unwrap_or(Value::Null);
            let _ = store.append_task_record(
                session_id,
                &json!({"type": "output", "id": task_id, "status": "failed", "output": e.to_string(), "metadata": metadata}),
            );
            Ok(ToolResult::error(format!("task failed: {e}")))
        }
    }
}

fn run_async(
    ctx: &ToolContext,
    task_id: &str,
    executor: std::sync::Arc<dyn crate::task::TaskExecutor>,
    request: TaskRequest,
) -> anyhow::Result<ToolResult> {
    let Some(task_manager) = ctx.task_manager.clone() else {
        return Ok(ToolResult::error("no TaskManager configured"));
    };
    let Some(store) = ctx.store.clone() else {
        return Ok(ToolResult::error("no session store available"));
    };

    // Detached from the caller: cancelling the call that created this task
    // must not implicitly kill it. Only TaskStop or the executor may end it.
    let cancel = CancellationToken::new();
    task_manager.register(task_id, cancel.clone());

    let _ = store.append_task_record(
        &ctx.session_id,
        &json!({"type": "output", "id": task_id, "status": "running"}),
    );

    let session_id = ctx.session_id.clone();
    let task_id_owned = task_id.to_string();
    let request_metadata = request.metadata.clone();
    tokio::spawn(async move {
        let outcome = executor.execute_task(cancel.clone(), request).await;
        let (status, output, metadata) = if cancel.is_cancelled() {
            ("cancelled".to_string(), String::new(), request_metadata.unwrap_or(Value::Null))
        } else {
            match outcome {
                Ok(result) => (
                    "completed".to_string(),
                    result.output,
                    result.metadata.or(request_metadata).unwrap_or(Value::Null),
                ),
                Err(e) => ("failed".to_string(), e.to_string(), request_metadata.unwrap_or(Value::Null)),
            }
        };
        let _ = store.append_task_record(
            &session_id,
            &json!({"type": "output", "id": task_id_owned, "status": status, "output": output, "metadata": metadata}),
        );
        task_manager.unregister(&task_id_owned);
    });

    Ok(ToolResult::ok(json!({"id": task_id, "status": "running"}).to_string()))
}
