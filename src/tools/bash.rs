//! Bash command tool (spec §4.6).

use std::process::Stdio;

use serde_json::{json, Value};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

#[cfg(unix)]
use std::os::unix::process::CommandExt;

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

const OUTPUT_CAP_BYTES: usize = 64 * 1024;
const TRUNCATION_MARKER: &str = "\n...[truncated]";

pub struct BashTool;

#[async_trait::async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "Bash"
    }

    fn description(&self) -> &str {
        "Run a shell command, capturing combined stdout/stderr."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"command": {"type": "string"}, "cwd": {"type": "string"}},
            "required": ["command"]
        })
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(command) = args.get("command").and_then(Value::as_str) else {
            return Ok(ToolResult::error("command is required"));
        };

        let cwd = match args.get("cwd").and_then(Value::as_str) {
            Some(cwd) => match ctx.sandbox.resolve_path(cwd, true) {
                Ok(p) => p,
                Err(e) => return Ok(ToolResult::error(e.to_string())),
            },
            None => ctx.cwd.clone(),
        };

        let mut builder = Command::new("sh");
        builder
            .arg("-lc")
            .arg(command)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        builder.process_group(0);

        let mut child = match builder.spawn() {
            Ok(c) => c,
            Err(e) => return Ok(ToolResult::error(format!("command failed: {e}"))),
        };

        let mut stdout_pipe = child.stdout.take().expect("stdout piped");
        let mut stderr_pipe = child.stderr.take().expect("stderr piped");

        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf).await;
            buf
        });

        let outcome = tokio::select! {
            status = child.wait() => status.map_err(|e| e.to_string()),
            _ = ctx.cancel.cancelled() => {
                #[cfg(unix)]
                if let Some(pid) = child.id() {
                    let _ = nix::sys::signal::killpg(
                        nix::unistd::Pid::from_raw(pid as i32),
                        nix::sys::signal::Signal::SIGKILL,
                    );
                }
                let _ = child.wait().await;
                Err("command cancelled".to_string())
            }
        };

        let stdout_bytes = stdout_task.await.unwrap_or_default();
        let stderr_bytes = stderr_task.await.unwrap_or_default();
        let stdout = String::from_utf8_lossy(&stdout_bytes).trim().to_string();
        let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();

        let mut combined = stdout;
        if !stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(&stderr);
        }
        combined = cap_output(combined);

        match outcome {
            Ok(status) if status.success() => Ok(ToolResult::ok(combined)),
            Ok(status) => {
                let code = status.code().map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string());
                Ok(ToolResult::error(format!("command failed: exit code {code}\n{combined}")))
            }
            Err(e) => Ok(ToolResult::error(format!("command failed: {e}\n{combined}"))),
        }
    }
}

fn cap_output(output: String) -> String {
    if output.len() <= OUTPUT_CAP_BYTES {
        return output;
    }
    let mut truncated = output;
    truncated.truncate(OUTPUT_CAP_BYTES);
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
