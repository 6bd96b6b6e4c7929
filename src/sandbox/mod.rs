//! Path resolution under an allow-list (spec §4.1).
//!
//! This is the single choke-point every filesystem-touching tool must route
//! through. Containment is checked component-wise against cleaned allowed
//! roots -- never a raw string prefix, so `/home/foo-evil` is never admitted
//! under an allowed root of `/home/foo`.

use std::path::{Component, Path, PathBuf};

use crate::error::SandboxError;

/// Enforces a filesystem allow-list. Holds no symlink-resolved state: per
/// spec, containment checking is lexical, not realpath-based.
pub struct Sandbox {
    allowed_roots: Vec<PathBuf>,
}

impl Sandbox {
    /// Build a sandbox from a list of allowed root directories. An empty
    /// list is valid but rejects every path (spec §4.1 step 2).
    pub fn new(allowed_roots: Vec<PathBuf>) -> Self {
        let allowed_roots = allowed_roots.iter().map(|r| clean_path(r)).collect();
        Self { allowed_roots }
    }

    /// Resolve `input` to an absolute path and verify it lies within the
    /// allow-list.
    ///
    /// 1. Relative inputs are joined onto the process CWD.
    /// 2. The result is lexically cleaned (`.`/`..`/duplicate separators
    ///    collapsed); symlinks are never resolved.
    /// 3. The cleaned path must be contained in at least one allowed root.
    /// 4. When `require_existing` is true, the target must `stat` as
    ///    present; otherwise a not-yet-existing path is returned as-is (used
    ///    by Write, and by Edit when creating a new file).
    pub fn resolve_path(&self, input: &str, require_existing: bool) -> Result<PathBuf, SandboxError> {
        let input_path = Path::new(input);
        let joined = if input_path.is_relative() {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(input_path)
        } else {
            input_path.to_path_buf()
        };
        let cleaned = clean_path(&joined);

        if !self.allowed_roots.iter().any(|root| cleaned.starts_with(root)) {
            return Err(SandboxError::OutOfSandbox(cleaned));
        }

        if require_existing {
            match std::fs::metadata(&cleaned) {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(SandboxError::NotFound(cleaned));
                }
                Err(e) => {
                    return Err(SandboxError::StatError {
                        path: cleaned,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(cleaned)
    }
}

/// Lexically clean a path: collapse `.` components, collapse `..` against a
/// preceding normal component, and leave the filesystem untouched (no
/// `canonicalize`, no symlink resolution).
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn clean_path_collapses_dotdot() {
        let cleaned = clean_path(Path::new("/tmp/s/../etc/passwd"));
        assert_eq!(cleaned, PathBuf::from("/tmp/etc/passwd"));
    }

    #[test]
    fn clean_path_collapses_dot_and_dupe_separators() {
        let cleaned = clean_path(Path::new("/a/./b//c"));
        assert_eq!(cleaned, PathBuf::from("/a/b/c"));
    }

    #[test]
    fn rejects_path_outside_allowed_root() {
        let sandbox = Sandbox::new(vec![PathBuf::from("/tmp/s")]);
        let result = sandbox.resolve_path("/tmp/s/../etc/passwd", false);
        assert!(matches!(result, Err(SandboxError::OutOfSandbox(_))));
    }

    #[test]
    fn rejects_sibling_with_shared_prefix() {
        // /home/foo-evil must never be admitted under allowed root /home/foo.
        let sandbox = Sandbox::new(vec![PathBuf::from("/home/foo")]);
        let result = sandbox.resolve_path("/home/foo-evil/x", false);
        assert!(matches!(result, Err(SandboxError::OutOfSandbox(_))));
    }

    #[test]
    fn empty_allow_list_rejects_everything() {
        let sandbox = Sandbox::new(vec![]);
        let result = sandbox.resolve_path("/tmp/anything", false);
        assert!(result.is_err());
    }

    #[test]
    fn accepts_path_within_root() {
        let tmp = TempDir::new().unwrap();
        let sandbox = Sandbox::new(vec![tmp.path().to_path_buf()]);
        let result = sandbox.resolve_path(tmp.path().join("a.txt").to_str().unwrap(), false);
        assert!(result.is_ok());
    }

    #[test]
    fn require_existing_rejects_missing_file() {
        let tmp = TempDir::new().unwrap();
        let sandbox = Sandbox::new(vec![tmp.path().to_path_buf()]);
        let missing = tmp.path().join("nope.txt");
        let result = sandbox.resolve_path(missing.to_str().unwrap(), true);
        assert!(matches!(result, Err(SandboxError::NotFound(_))));
    }

    #[test]
    fn require_existing_accepts_present_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("present.txt");
        std::fs::write(&file, "hi").unwrap();
        let sandbox = Sandbox::new(vec![tmp.path().to_path_buf()]);
        let result = sandbox.resolve_path(file.to_str().unwrap(), true);
        assert!(result.is_ok());
    }

    #[test]
    fn relative_path_resolved_against_cwd() {
        let tmp = TempDir::new().unwrap();
        let sandbox = Sandbox::new(vec![std::env::current_dir().unwrap()]);
        let result = sandbox.resolve_path("Cargo.toml", false);
        // Whatever the CWD is, a relative path should join onto it and come
        // back absolute.
        assert!(result.unwrap().is_absolute());
        drop(tmp);
    }
}
