//! Filesystem side effects: content rewrites and no-clobber renames.
//!
//! ## `atomic_write`: 4-step protocol
//!
//! 1. Write the new content to `<path>.tether.tmp`.
//! 2. Copy the original file's permissions onto the tmp file (best effort).
//! 3. Rename tmp over the final path (atomic on POSIX).
//! 4. On rename failure remove the tmp file and leave the original intact.
//!
//! Content is written byte-for-byte; line endings are never normalised.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::FileError;

/// Replace the content of `path` without exposing a half-written file.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), FileError> {
    let tmp = PathBuf::from(format!("{}.tether.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), FileError> {
    let write_err = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };

    std::fs::write(tmp, content).map_err(write_err)?;

    if let Ok(meta) = std::fs::metadata(path) {
        let _ = std::fs::set_permissions(tmp, meta.permissions());
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(write_err(e));
    }
    Ok(())
}

/// Rename `from` to `to`, refusing to replace an existing file.
///
/// The existence check is repeated here, immediately before the rename, so a
/// file created after planning still wins.
pub(crate) fn rename_no_clobber(from: &Path, to: &Path) -> Result<(), FileError> {
    match std::fs::symlink_metadata(to) {
        Ok(_) => {
            return Err(FileError::RenameConflict {
                path: from.to_path_buf(),
                target: to.to_path_buf(),
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(FileError::Write {
                path: from.to_path_buf(),
                source: e,
            })
        }
    }

    std::fs::rename(from, to).map_err(|source| FileError::Write {
        path: from.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn write_replaces_content_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.yaml");
        fs::write(&path, "old\n").unwrap();
        atomic_write(&path, "line1\r\nline2\r\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "line1\r\nline2\r\n");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.yaml");
        fs::write(&path, "x").unwrap();
        atomic_write(&path, "data").unwrap();
        let tmp_path = PathBuf::from(format!("{}.tether.tmp", path.display()));
        assert!(!tmp_path.exists(), ".tether.tmp must be cleaned up");
    }

    #[test]
    #[cfg(unix)]
    fn write_keeps_original_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("mode.yaml");
        fs::write(&path, "x").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        atomic_write(&path, "y").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("file.yaml");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("file.yaml.tether.tmp");

        let result = atomic_write_with_tmp(&path, "new content", &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root ignores directory permissions; only assert when the rename failed.
        if let Err(err) = result {
            assert!(matches!(err, FileError::Write { .. }));
            assert_eq!(fs::read_to_string(&path).unwrap(), "original");
            assert!(!tmp_path.exists(), ".tether.tmp should be cleaned up");
        }
    }

    #[test]
    fn rename_moves_file() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("a.yaml");
        let to = tmp.path().join("b.yaml");
        fs::write(&from, "content").unwrap();

        rename_no_clobber(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "content");
    }

    #[test]
    fn rename_never_clobbers() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("a.yaml");
        let to = tmp.path().join("b.yaml");
        fs::write(&from, "mine").unwrap();
        fs::write(&to, "theirs").unwrap();

        let err = rename_no_clobber(&from, &to).unwrap_err();
        assert!(matches!(err, FileError::RenameConflict { .. }));
        assert_eq!(fs::read_to_string(&from).unwrap(), "mine");
        assert_eq!(fs::read_to_string(&to).unwrap(), "theirs");
    }
}
