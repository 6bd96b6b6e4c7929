//! Atomic filesystem writes (spec §4.2).
//!
//! A write must never leave a half-written file visible under its final
//! name: stage the bytes in a sibling temp file on the same filesystem, fix
//! up permissions before the descriptor closes, then rename over the
//! destination. `rename` within one filesystem is atomic, so readers only
//! ever see the old file or the fully-written new one.

use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Write `data` to `path` atomically. `mode` is applied to the temp file
/// before it's renamed into place (ignored on non-unix targets).
pub fn write_atomic(path: &Path, data: &[u8], mode: u32) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let tmp_path = temp_path_in(parent, path);

    if let Err(e) = write_and_sync(&tmp_path, data, mode) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

fn write_and_sync(tmp_path: &Path, data: &[u8], mode: u32) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(tmp_path)?;
    file.write_all(data)?;

    #[cfg(unix)]
    {
        let mut perms = file.metadata()?.permissions();
        perms.set_mode(mode);
        file.set_permissions(perms)?;
    }
    #[cfg(not(unix))]
    {
        let _ = mode;
    }

    file.sync_all()
}

fn temp_path_in(parent: &Path, target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tmp".to_string());
    parent.join(format!(".{name}.{}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_creates_file_with_contents() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.txt");
        write_atomic(&target, b"hello", 0o644).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    }

    #[test]
    fn write_atomic_leaves_no_temp_file_behind() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.txt");
        write_atomic(&target, b"hello", 0o644).unwrap();
        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_atomic_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.txt");
        write_atomic(&target, b"first", 0o644).unwrap();
        write_atomic(&target, b"second", 0o644).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn write_atomic_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a/b/c/out.txt");
        write_atomic(&target, b"nested", 0o644).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "nested");
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_applies_mode() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("secret.txt");
        write_atomic(&target, b"x", 0o600).unwrap();
        let perms = std::fs::metadata(&target).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
