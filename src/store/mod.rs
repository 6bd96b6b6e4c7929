//! Session Store (spec §4.3): per-session append-only JSONL event log, plus
//! the small amount of scratch state layered on top of it (project→last
//! session, backups, plan mode, todos).
//!
//! Layout under `base_dir`:
//!
//! ```text
//! sessions/<id>.jsonl
//! projects/<hash>/last_session
//! session-env/<id>/backup/<name>-<hash6>
//! session-env/<id>/plan_mode
//! session-env/<id>/todo.json
//! ```

use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::sandbox::clean_path;

#[derive(Debug, Clone)]
pub struct Store {
    base_dir: PathBuf,
}

/// Wrapper used by `AppendStreamJSONLine` so stream-json lines can be
/// distinguished from arbitrary JSON events on replay.
#[derive(Debug, Serialize, Deserialize)]
struct StreamJsonRecord {
    #[serde(rename = "type")]
    kind: String,
    line: String,
}

impl Store {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn sessions_dir(&self) -> PathBuf {
        self.base_dir.join("sessions")
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.sessions_dir().join(format!("{session_id}.jsonl"))
    }

    fn session_env_dir(&self, session_id: &str) -> PathBuf {
        self.base_dir.join("session-env").join(session_id)
    }

    fn tasks_path(&self, session_id: &str) -> PathBuf {
        self.session_env_dir(session_id).join("tasks.jsonl")
    }

    /// Append one record to `session-env/<id>/tasks.jsonl`.
    pub fn append_task_record(&self, session_id: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let dir = self.session_env_dir(session_id);
        std::fs::create_dir_all(&dir)?;
        set_dir_mode(&dir, 0o755);

        let encoded = serde_json::to_string(value)?;
        let path = self.tasks_path(session_id);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        set_file_mode(&path, 0o600);
        writeln!(file, "{encoded}")?;
        Ok(())
    }

    /// Every task record for a session, in file order. Missing file reads
    /// as empty; malformed lines are skipped.
    pub fn load_task_records(&self, session_id: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let path = self.tasks_path(session_id);
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::IoError(e)),
        };
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect())
    }

    /// JSON-encode `value` and append it as one line to the session's log.
    pub fn append_event(&self, session_id: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        if session_id.is_empty() {
            return Err(StoreError::EmptySessionId);
        }

        let dir = self.sessions_dir();
        std::fs::create_dir_all(&dir)?;
        set_dir_mode(&dir, 0o755);

        let encoded = serde_json::to_string(value)?;

        let path = self.session_path(session_id);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        set_file_mode(&path, 0o600);
        writeln!(file, "{encoded}")?;
        Ok(())
    }

    /// Trim `line`; skip silently if it's now empty; otherwise wrap and
    /// delegate to `append_event`.
    pub fn append_stream_json_line(&self, session_id: &str, line: &str) -> Result<(), StoreError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        let record = StreamJsonRecord {
            kind: "stream_json".to_string(),
            line: trimmed.to_string(),
        };
        let value = serde_json::to_value(&record)?;
        self.append_event(session_id, &value)
    }

    /// Read every event recorded for a session, in order. Missing session
    /// file surfaces as `SessionNotFound`; individual blank lines are
    /// skipped.
    pub fn load_events(&self, session_id: &str) -> Result<Vec<serde_json::Value>, StoreError> {
        let path = self.session_path(session_id);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::SessionNotFound(session_id.to_string())
            } else {
                StoreError::IoError(e)
            }
        })?;

        let mut events = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
                events.push(value);
            }
        }
        Ok(events)
    }

    /// Filter `load_events` to stream-json records, returning each `line`
    /// payload in order. Malformed rows are skipped rather than failing the
    /// whole replay.
    pub fn load_stream_json_lines(&self, session_id: &str) -> Result<Vec<String>, StoreError> {
        let events = self.load_events(session_id)?;
        Ok(events
            .into_iter()
            .filter(|event| event.get("type").and_then(|t| t.as_str()) == Some("stream_json"))
            .filter_map(|event| event.get("line").and_then(|l| l.as_str()).map(str::to_string))
            .collect())
    }

    /// Append every event of `from` onto `to`. No-op when `from == to`.
    pub fn clone_session(&self, from: &str, to: &str) -> Result<(), StoreError> {
        if from.is_empty() || to.is_empty() {
            return Err(StoreError::EmptySessionId);
        }
        if from == to {
            return Ok(());
        }
        for event in self.load_events(from)? {
            self.append_event(to, &event)?;
        }
        Ok(())
    }

    fn project_dir(&self, project_hash: &str) -> PathBuf {
        self.base_dir.join("projects").join(project_hash)
    }

    pub fn save_last_session(&self, project_hash: &str, session_id: &str) -> Result<(), StoreError> {
        let dir = self.project_dir(project_hash);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("last_session");
        std::fs::write(&path, session_id)?;
        set_file_mode(&path, 0o600);
        Ok(())
    }

    pub fn load_last_session(&self, project_hash: &str) -> Result<Option<String>, StoreError> {
        let path = self.project_dir(project_hash).join("last_session");
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::IoError(e)),
        }
    }

    /// List known sessions, most recently modified first. Entries whose
    /// metadata can't be read are silently skipped.
    pub fn list_sessions(&self, limit: Option<usize>) -> Result<Vec<String>, StoreError> {
        let dir = self.sessions_dir();
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::IoError(e)),
        };

        let mut entries: Vec<(String, std::time::SystemTime)> = Vec::new();
        for entry in read_dir.flatten() {
            let info = match entry.metadata() {
                Ok(info) => info,
                Err(_) => continue,
            };
            let modified = match info.modified() {
                Ok(m) => m,
                Err(_) => continue,
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            // Open Question (a): trim *any* extension, not just ".jsonl" --
            // keeps ListSessions robust if non-jsonl files end up in the
            // directory.
            let stem = Path::new(&name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(name);
            entries.push((stem, modified));
        }

        entries.sort_by(|a, b| b.1.cmp(&a.1));
        let mut names: Vec<String> = entries.into_iter().map(|(name, _)| name).collect();
        if let Some(limit) = limit {
            if limit > 0 {
                names.truncate(limit);
            }
        }
        Ok(names)
    }

    /// `SetPlanMode`/`IsPlanMode`: plan mode is the presence of a marker
    /// file, not a field in any record.
    pub fn set_plan_mode(&self, session_id: &str, enabled: bool) -> Result<(), StoreError> {
        let dir = self.session_env_dir(session_id);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("plan_mode");
        if enabled {
            std::fs::write(&path, "1")?;
            set_file_mode(&path, 0o600);
        } else {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::IoError(e)),
            }
        }
        Ok(())
    }

    pub fn is_plan_mode(&self, session_id: &str) -> bool {
        self.session_env_dir(session_id).join("plan_mode").exists()
    }

    pub fn todo_path(&self, session_id: &str) -> PathBuf {
        self.session_env_dir(session_id).join("todo.json")
    }

    /// Persist pretty-printed todos JSON. Returns the path written.
    pub fn save_todos(&self, session_id: &str, todos: &serde_json::Value) -> Result<PathBuf, StoreError> {
        let dir = self.session_env_dir(session_id);
        std::fs::create_dir_all(&dir)?;
        let path = self.todo_path(session_id);
        let pretty = serde_json::to_string_pretty(todos)?;
        std::fs::write(&path, pretty)?;
        set_file_mode(&path, 0o600);
        Ok(path)
    }

    /// `backupFile(ctx, path)`: no-op when `path` doesn't exist or is a
    /// directory. Otherwise copies the file's current bytes under a
    /// collision-resistant name into `session-env/<id>/backup/`.
    pub fn backup_file(&self, session_id: &str, path: &Path) -> Result<(), StoreError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(StoreError::IoError(e)),
        };
        if metadata.is_dir() {
            return Ok(());
        }

        let backup_dir = self.session_env_dir(session_id).join("backup");
        std::fs::create_dir_all(&backup_dir)?;

        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(path.to_string_lossy().as_bytes());
        let digest = hasher.finalize();
        let hash6 = hex_prefix(&digest, 6);
        let backup_name = format!("{basename}-{hash6}");

        let data = std::fs::read(path)?;
        let backup_path = backup_dir.join(backup_name);
        std::fs::write(&backup_path, &data)?;
        set_file_mode(&backup_path, 0o600);
        Ok(())
    }
}

/// `ProjectHash(path)` = `hex(SHA-256(Clean(path))[:8])`.
pub fn project_hash(path: &Path) -> String {
    let cleaned = clean_path(path);
    let mut hasher = Sha256::new();
    hasher.update(cleaned.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex_prefix(&digest, 8)
}

fn hex_prefix(digest: &[u8], n: usize) -> String {
    digest.iter().take(n).map(|b| format!("{b:02x}")).collect()
}

#[cfg(unix)]
fn set_file_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(path) {
        let mut perms = meta.permissions();
        perms.set_mode(mode);
        let _ = std::fs::set_permissions(path, perms);
    }
}

#[cfg(not(unix))]
fn set_file_mode(_path: &Path, _mode: u32) {}

#[cfg(unix)]
fn set_dir_mode(path: &Path, mode: u32) {
    set_file_mode(path, mode);
}

#[cfg(not(unix))]
fn set_dir_mode(_path: &Path, _mode: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().to_path_buf());
        (tmp, store)
    }

    #[test]
    fn append_and_load_events_round_trip() {
        let (_tmp, store) = store();
        store.append_event("s1", &json!({"a": 1})).unwrap();
        store.append_event("s1", &json!({"a": 2})).unwrap();
        let events = store.load_events("s1").unwrap();
        assert_eq!(events, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn append_event_rejects_empty_session_id() {
        let (_tmp, store) = store();
        let result = store.append_event("", &json!({}));
        assert!(matches!(result, Err(StoreError::EmptySessionId)));
    }

    #[test]
    fn load_events_missing_session_is_not_found() {
        let (_tmp, store) = store();
        let result = store.load_events("nope");
        assert!(matches!(result, Err(StoreError::SessionNotFound(_))));
    }

    #[test]
    fn append_stream_json_line_skips_blank_lines() {
        let (_tmp, store) = store();
        store.append_stream_json_line("s1", "   ").unwrap();
        store.append_stream_json_line("s1", "real line").unwrap();
        let lines = store.load_stream_json_lines("s1").unwrap();
        assert_eq!(lines, vec!["real line".to_string()]);
    }

    #[test]
    fn load_stream_json_lines_skips_non_stream_events() {
        let (_tmp, store) = store();
        store.append_event("s1", &json!({"type": "other", "x": 1})).unwrap();
        store.append_stream_json_line("s1", "only this one").unwrap();
        let lines = store.load_stream_json_lines("s1").unwrap();
        assert_eq!(lines, vec!["only this one".to_string()]);
    }

    #[test]
    fn load_events_skips_malformed_lines() {
        let (_tmp, store) = store();
        let path = store.session_path("s1");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{\"a\":1}\nnot json\n\n{\"a\":2}\n").unwrap();
        let events = store.load_events("s1").unwrap();
        assert_eq!(events, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn clone_session_copies_all_events() {
        let (_tmp, store) = store();
        store.append_event("from", &json!({"a": 1})).unwrap();
        store.append_event("from", &json!({"a": 2})).unwrap();
        store.clone_session("from", "to").unwrap();
        assert_eq!(store.load_events("to").unwrap(), store.load_events("from").unwrap());
    }

    #[test]
    fn clone_session_is_noop_when_same_id() {
        let (_tmp, store) = store();
        store.append_event("s1", &json!({"a": 1})).unwrap();
        store.clone_session("s1", "s1").unwrap();
        assert_eq!(store.load_events("s1").unwrap().len(), 1);
    }

    #[test]
    fn last_session_round_trip() {
        let (_tmp, store) = store();
        assert_eq!(store.load_last_session("hash1").unwrap(), None);
        store.save_last_session("hash1", "session-42").unwrap();
        assert_eq!(store.load_last_session("hash1").unwrap(), Some("session-42".to_string()));
    }

    #[test]
    fn list_sessions_sorted_newest_first_and_respects_limit() {
        let (_tmp, store) = store();
        store.append_event("old", &json!({})).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        store.append_event("new", &json!({})).unwrap();

        let all = store.list_sessions(None).unwrap();
        assert_eq!(all, vec!["new".to_string(), "old".to_string()]);

        let limited = store.list_sessions(Some(1)).unwrap();
        assert_eq!(limited, vec!["new".to_string()]);
    }

    #[test]
    fn list_sessions_empty_dir_returns_empty() {
        let (_tmp, store) = store();
        assert_eq!(store.list_sessions(None).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn plan_mode_set_and_clear() {
        let (_tmp, store) = store();
        assert!(!store.is_plan_mode("s1"));
        store.set_plan_mode("s1", true).unwrap();
        assert!(store.is_plan_mode("s1"));
        store.set_plan_mode("s1", false).unwrap();
        assert!(!store.is_plan_mode("s1"));
    }

    #[test]
    fn plan_mode_clear_when_absent_is_ok() {
        let (_tmp, store) = store();
        store.set_plan_mode("s1", false).unwrap();
    }

    #[test]
    fn save_todos_writes_pretty_json() {
        let (_tmp, store) = store();
        let todos = json!([{"content": "a", "status": "pending"}]);
        let path = store.save_todos("s1", &todos).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, todos);
    }

    #[test]
    fn backup_file_noop_for_missing_path() {
        let (_tmp, store) = store();
        store.backup_file("s1", Path::new("/does/not/exist")).unwrap();
    }

    #[test]
    fn backup_file_noop_for_directory() {
        let (tmp, store) = store();
        let dir = tmp.path().join("somedir");
        std::fs::create_dir(&dir).unwrap();
        store.backup_file("s1", &dir).unwrap();
        let backup_dir = store.session_env_dir("s1").join("backup");
        assert!(!backup_dir.exists());
    }

    #[test]
    fn backup_file_copies_bytes_under_hashed_name() {
        let (tmp, store) = store();
        let target = tmp.path().join("file.txt");
        std::fs::write(&target, "original contents").unwrap();
        store.backup_file("s1", &target).unwrap();

        let backup_dir = store.session_env_dir("s1").join("backup");
        let entries: Vec<_> = std::fs::read_dir(&backup_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let entry = entries.into_iter().next().unwrap().unwrap();
        let name = entry.file_name().to_string_lossy().into_owned();
        assert!(name.starts_with("file.txt-"));
        assert_eq!(std::fs::read_to_string(entry.path()).unwrap(), "original contents");
    }

    #[test]
    fn project_hash_is_stable_and_sixteen_hex_chars() {
        let a = project_hash(Path::new("/tmp/proj/../proj/x"));
        let b = project_hash(Path::new("/tmp/proj/x"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn task_records_round_trip_in_order() {
        let (_tmp, store) = store();
        store.append_task_record("s1", &json!({"status": "created"})).unwrap();
        store.append_task_record("s1", &json!({"status": "running"})).unwrap();
        let records = store.load_task_records("s1").unwrap();
        assert_eq!(records, vec![json!({"status": "created"}), json!({"status": "running"})]);
    }

    #[test]
    fn load_task_records_missing_file_is_empty() {
        let (_tmp, store) = store();
        assert_eq!(store.load_task_records("nope").unwrap(), Vec::<serde_json::Value>::new());
    }

    #[test]
    fn project_hash_differs_for_different_paths() {
        let a = project_hash(Path::new("/tmp/a"));
        let b = project_hash(Path::new("/tmp/b"));
        assert_ne!(a, b);
    }
}
