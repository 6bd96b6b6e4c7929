//! WebFetch tool (spec §4.7): bounded GET with early-stop truncation.

use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

const TRUNCATION_MARKER: &str = "\n...[truncated]";

pub struct WebFetchTool;

#[async_trait::async_trait]
impl Tool for WebFetchTool {
    fn name(&self) -> &str {
        "WebFetch"
    }

    fn description(&self) -> &str {
        "Fetch an http(s) URL, optionally capped to max_bytes."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"url": {"type": "string"}, "max_bytes": {"type": "integer"}},
            "required": ["url"]
        })
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(url) = args.get("url").and_then(Value::as_str) else {
            return Ok(ToolResult::error("url is required"));
        };
        let max_bytes = args.get("max_bytes").and_then(Value::as_u64).map(|n| n as usize);

        let parsed = match url::Url::parse(url) {
            Ok(u) => u,
            Err(e) => return Ok(ToolResult::error(format!("invalid url: {e}"))),
        };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Ok(ToolResult::error("url must use http or https"));
        }

        let client = match reqwest::Client::builder().timeout(Duration::from_secs(30)).build() {
            Ok(c) => c,
            Err(e) => return Ok(ToolResult::error(format!("client build failed: {e}"))),
        };

        let cancel = ctx.cancel.clone();
        let response = tokio::select! {
            result = client.get(url).send() => match result {
                Ok(r) => r,
                Err(e) => return Ok(ToolResult::error(format!("request failed: {e}"))),
            },
            _ = cancel.cancelled() => return Ok(ToolResult::error("cancelled")),
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            return Ok(ToolResult::error(format!("HTTP {status}")));
        }

        let mut body = Vec::new();
        let mut truncated = false;
        let mut stream = response.bytes_stream();
        loop {
            let chunk = tokio::select! {
                chunk = stream.next() => chunk,
                _ = cancel.cancelled() => return Ok(ToolResult::error("cancelled")),
            };
            let Some(chunk) = chunk else { break };
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => return Ok(ToolResult::error(format!("read failed: {e}"))),
            };
            body.extend_from_slice(&chunk);
            if let Some(max_bytes) = max_bytes {
                if body.len() >= max_bytes {
                    body.truncate(max_bytes);
                    truncated = true;
                    break;
                }
            }
        }

        let mut text = String::from_utf8_lossy(&body).into_owned();
        if truncated {
            text.push_str(TRUNCATION_MARKER);
        }
        Ok(ToolResult::ok(text))
    }
}
