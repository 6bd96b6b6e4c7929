//! Edit tool (spec §4.5): Claude-style string replace, unified-diff patch,
//! or a `replacements[]` list, in that priority order.

use std::path::Path;

use serde_json::{json, Value};

use super::context::{ToolContext, ToolResult};
use super::registry::Tool;
use crate::fsutil::write_atomic;

pub struct EditTool;

#[async_trait::async_trait]
impl Tool for EditTool {
    fn name(&self) -> &str {
        "Edit"
    }

    fn description(&self) -> &str {
        "Edit a file in place via string replacement, unified diff, or a replacement list."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string"},
                "path": {"type": "string"},
                "old_string": {"type": "string"},
                "new_string": {"type": "string"},
                "patch": {"type": "string"},
                "replacements": {"type": "array"}
            }
        })
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
        run_edit(args, ctx).await
    }
}

pub async fn run_edit(args: Value, ctx: &ToolContext) -> anyhow::Result<ToolResult> {
    let Some(file_path) = args
        .get("file_path")
        .or_else(|| args.get("path"))
        .and_then(Value::as_str)
    else {
        return Ok(ToolResult::error("file_path is required"));
    };

    let has_old_or_new = args.get("old_string").is_some() || args.get("new_string").is_some();
    let old_string = args.get("old_string").and_then(Value::as_str).unwrap_or("");
    let new_string = args.get("new_string").and_then(Value::as_str).unwrap_or("");
    let patch = args.get("patch").and_then(Value::as_str).unwrap_or("");
    let replacements = args.get("replacements").and_then(Value::as_array);

    let require_existing = !(has_old_or_new && old_string.is_empty());
    let resolved = match ctx.sandbox.resolve_path(file_path, require_existing) {
        Ok(p) => p,
        Err(e) => return Ok(ToolResult::error(e.to_string())),
    };

    let original = if resolved.exists() {
        match std::fs::read_to_string(&resolved) {
            Ok(s) => s,
            Err(e) => return Ok(ToolResult::error(format!("read failed: {e}"))),
        }
    } else {
        String::new()
    };

    let updated = if has_old_or_new {
        match apply_claude_style(&original, old_string, new_string) {
            Ok(u) => u,
            Err(e) => return Ok(ToolResult::error(e)),
        }
    } else if !patch.trim().is_empty() {
        match apply_unified_diff(&original, patch) {
            Ok(u) => u,
            Err(e) => return Ok(ToolResult::error(e)),
        }
    } else if let Some(replacements) = replacements.filter(|r| !r.is_empty()) {
        match apply_replacements(&original, replacements) {
            Ok(u) => u,
            Err(e) => return Ok(ToolResult::error(e)),
        }
    } else {
        return Ok(ToolResult::error(
            "either old_string/new_string or patch/replacements must be provided",
        ));
    };

    if let Some(store) = ctx.store() {
        if resolved.exists() {
            if let Err(e) = store.backup_file(&ctx.session_id, &resolved) {
                return Ok(ToolResult::error(format!("backup failed: {e}")));
            }
        }
    }

    let parent = resolved.parent().unwrap_or_else(|| Path::new("."));
    if let Err(e) = std::fs::create_dir_all(parent) {
        return Ok(ToolResult::error(format!("mkdir failed: {e}")));
    }

    let mode = std::fs::metadata(&resolved)
        .map(|m| preserved_mode(&m))
        .unwrap_or(0o644);

    if let Err(e) = write_atomic(&resolved, updated.as_bytes(), mode) {
        return Ok(ToolResult::error(format!("write failed: {e}")));
    }

    Ok(ToolResult::ok("ok"))
}

#[cfg(unix)]
fn preserved_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn preserved_mode(_metadata: &std::fs::Metadata) -> u32 {
    0o644
}

fn apply_claude_style(original: &str, old_string: &str, new_string: &str) -> Result<String, String> {
    if old_string.is_empty() {
        return Ok(new_string.to_string());
    }

    let updated = if new_string.is_empty() && !old_string.ends_with('\n') {
        let with_newline = format!("{old_string}\n");
        if let Some(pos) = original.find(&with_newline) {
            let mut out = String::with_capacity(original.len());
            out.push_str(&original[..pos]);
            out.push_str(&original[pos + with_newline.len()..]);
            out
        } else if let Some(pos) = original.find(old_string) {
            let mut out = String::with_capacity(original.len());
            out.push_str(&original[..pos]);
            out.push_str(new_string);
            out.push_str(&original[pos + old_string.len()..]);
            out
        } else {
            return Err("original and edited file match; failed to apply edit".to_string());
        }
    } else if let Some(pos) = original.find(old_string) {
        let mut out = String::with_capacity(original.len());
        out.push_str(&original[..pos]);
        out.push_str(new_string);
        out.push_str(&original[pos + old_string.len()..]);
        out
    } else {
        return Err("original and edited file match; failed to apply edit".to_string());
    };

    if updated == original {
        return Err("original and edited file match; failed to apply edit".to_string());
    }
    Ok(updated)
}

fn apply_replacements(original: &str, replacements: &[Value]) -> Result<String, String> {
    let mut current = original.to_string();
    for replacement in replacements {
        let old = replacement.get("old").and_then(Value::as_str).unwrap_or("");
        let new = replacement.get("new").and_then(Value::as_str).unwrap_or("");
        let count = replacement.get("count").and_then(Value::as_i64).unwrap_or(1);
        if old.is_empty() {
            continue;
        }
        current = if count < 0 {
            current.replace(old, new)
        } else {
            current.replacen(old, new, count as usize)
        };
    }
    Ok(current)
}

fn apply_unified_diff(original: &str, patch: &str) -> Result<String, String> {
    let lines: Vec<&str> = original.split('\n').collect();
    let patch_lines: Vec<&str> = patch.split('\n').collect();
    let line_count = lines.len();

    let mut output: Vec<String> = Vec::new();
    let mut orig_index = 0usize;
    let mut i = 0usize;

    while i < patch_lines.len() {
        let line = patch_lines[i];
        if line.starts_with("---") || line.starts_with("+++") {
            i += 1;
            continue;
        }
        if let Some(start) = parse_hunk_header(line) {
            let start = start.saturating_sub(1).min(line_count);
            if start > orig_index {
                output.extend(lines[orig_index..start].iter().map(|s| s.to_string()));
            }
            orig_index = start;
            i += 1;

            while i < patch_lines.len() && !patch_lines[i].starts_with("@@") {
                let hunk_line = patch_lines[i];
                if hunk_line == "\\ No newline at end of file" {
                    i += 1;
                    continue;
                }
                let (tag, rest) = if hunk_line.is_empty() {
                    (' ', "")
                } else {
                    (hunk_line.chars().next().unwrap(), &hunk_line[1..])
                };
                match tag {
                    ' ' => {
                        let expected = lines.get(orig_index).copied().unwrap_or("");
                        if expected != rest {
                            return Err(format!("context mismatch at line {}", orig_index + 1));
                        }
                        output.push(expected.to_string());
                        orig_index += 1;
                    }
                    '-' => {
                        let expected = lines.get(orig_index).copied().unwrap_or("");
                        if expected != rest {
                            return Err(format!("delete mismatch at line {}", orig_index + 1));
                        }
                        orig_index += 1;
                    }
                    '+' => {
                        output.push(rest.to_string());
                    }
                    _ => return Err("invalid hunk header".to_string()),
                }
                i += 1;
            }
            continue;
        }
        i += 1;
    }

    if orig_index < line_count {
        output.extend(lines[orig_index..].iter().map(|s| s.to_string()));
    }

    Ok(output.join("\n"))
}

fn parse_hunk_header(line: &str) -> Option<i64> {
    let rest = line.strip_prefix("@@ -")?;
    let start_str = rest.split([',', ' ']).next()?;
    start_str.parse::<i64>().ok().or(Some(
        start_str.trim_start_matches('-').parse::<i64>().unwrap_or(0),
    ))
}
