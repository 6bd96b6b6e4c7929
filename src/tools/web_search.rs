//! WebSearch tool (spec §4.7): JSON-endpoint or HTML-scrape, env-overridable
//! base URL.

use std::time::Duration;

use scraper::{Html, Selector};
use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;

const DEFAULT_NUM_RESULTS: usize = 5;

pub struct WebSearchTool;

#[async_trait::async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "WebSearch"
    }

    fn description(&self) -> &str {
        "Search the web and return title/url/snippet results."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"query": {"type": "string"}, "num_results": {"type": "integer"}},
            "required": ["query"]
        })
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        let Some(query) = args.get("query").and_then(Value::as_str) else {
            return Ok(ToolResult::error("query is required"));
        };
        let num_results = args
            .get("num_results")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_NUM_RESULTS);

        let base_url = std::env::var("OPENCLOUDE_WEBSEARCH_URL")
            .unwrap_or_else(|_| "https://html.duckduckgo.com/html/".to_string());

        let mut url = match url::Url::parse(&base_url) {
            Ok(u) => u,
            Err(e) => return Ok(ToolResult::error(format!("invalid search url: {e}"))),
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            return Ok(ToolResult::error("search url must use http or https"));
        }
        url.query_pairs_mut().append_pair("q", query);

        let client = match reqwest::Client::builder().timeout(Duration::from_secs(10)).build() {
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

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = tokio::select! {
            result = response.text() => match result {
                Ok(t) => t,
                Err(e) => return Ok(ToolResult::error(format!("read failed: {e}"))),
            },
            _ = cancel.cancelled() => return Ok(ToolResult::error("cancelled")),
        };

        let results = if content_type.contains("application/json") {
            match parse_json_results(&body) {
                Ok(r) => r,
                Err(e) => return Ok(ToolResult::error(e)),
            }
        } else {
            parse_html_results(&body)
        };

        let truncated: Vec<Value> = results.into_iter().take(num_results).collect();
        Ok(ToolResult::ok(json!({"query": query, "results": truncated}).to_string()))
    }
}

fn parse_json_results(body: &str) -> Result<Vec<Value>, String> {
    let parsed: Value = serde_json::from_str(body).map_err(|e| format!("invalid json response: {e}"))?;
    let results = parsed
        .get("results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Ok(results)
}

fn parse_html_results(html: &str) -> Vec<Value> {
    let document = Html::parse_document(html);
    let Ok(link_selector) = Selector::parse("a.result__a") else {
        return Vec::new();
    };
    let Ok(snippet_selector) = Selector::parse("a.result__snippet") else {
        return Vec::new();
    };

    let links: Vec<_> = document.select(&link_selector).collect();
    let snippets: Vec<_> = document.select(&snippet_selector).collect();

    links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let title = link.text().collect::<String>().trim().to_string();
            let url = link.value().attr("href").unwrap_or("").trim().to_string();
            let snippet = snippets
                .get(i)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            json!({"title": title, "url": url, "snippet": snippet})
        })
        .collect()
}
