//! Recursive copy without recursion.
//!
//! Directory trees are walked depth-first with an explicit stack so that deep trees cannot
//! exhaust the call stack. Each destination directory is created before anything is copied
//! into it. The first failure aborts the copy and leaves whatever was already written in place.

use crate::{io_context, FilesResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Copies `source` (file or directory tree) to `destination`.
///
/// The top-level `source` is followed if it is a symlink (the caller has already checked where
/// it leads); symlinks and special files found *inside* a directory tree are skipped.
///
/// Returns the number of regular files copied.
pub(crate) fn copy_tree(source: &Path, destination: &Path) -> FilesResult<u64> {
    let metadata = fs::metadata(source).map_err(|e| io_context(e, "stat", source))?;

    if metadata.is_file() {
        fs::copy(source, destination).map_err(|e| io_context(e, "copy", source))?;
        return Ok(1);
    }

    let mut copied = 0u64;
    let mut pending: Vec<(PathBuf, PathBuf)> =
        vec![(source.to_path_buf(), destination.to_path_buf())];

    while let Some((from_dir, to_dir)) = pending.pop() {
        fs::create_dir_all(&to_dir).map_err(|e| io_context(e, "create directory", &to_dir))?;

        let entries = fs::read_dir(&from_dir).map_err(|e| io_context(e, "read", &from_dir))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_context(e, "read", &from_dir))?;
            let from = entry.path();
            let to = to_dir.join(entry.file_name());
            let file_type = entry
                .file_type()
                .map_err(|e| io_context(e, "stat", &from))?;

            if file_type.is_dir() {
                pending.push((from, to));
            } else if file_type.is_file() {
                fs::copy(&from, &to).map_err(|e| io_context(e, "copy", &from))?;
                copied += 1;
            } else {
                tracing::debug!(path = %from.display(), "skipping non-regular entry during copy");
            }
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_single_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("a.txt");
        fs::write(&src, b"hello").unwrap();

        let dest = temp.path().join("b.txt");
        assert_eq!(copy_tree(&src, &dest).unwrap(), 1);
        assert_eq!(fs::read(&dest).unwrap(), b"hello");
        assert!(src.exists());
    }

    #[test]
    fn test_copy_nested_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("x/y/z")).unwrap();
        fs::create_dir_all(src.join("empty")).unwrap();
        fs::write(src.join("top.txt"), b"1").unwrap();
        fs::write(src.join("x/mid.txt"), b"22").unwrap();
        fs::write(src.join("x/y/z/deep.txt"), b"333").unwrap();

        let dest = temp.path().join("dest");
        assert_eq!(copy_tree(&src, &dest).unwrap(), 3);

        assert_eq!(fs::read(dest.join("top.txt")).unwrap(), b"1");
        assert_eq!(fs::read(dest.join("x/mid.txt")).unwrap(), b"22");
        assert_eq!(fs::read(dest.join("x/y/z/deep.txt")).unwrap(), b"333");
        assert!(dest.join("empty").is_dir());
    }

    #[test]
    fn test_copy_deep_tree_does_not_recurse() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let mut deepest = src.clone();
        for i in 0..64 {
            deepest.push(format!("d{i}"));
        }
        fs::create_dir_all(&deepest).unwrap();
        fs::write(deepest.join("leaf"), b"leaf").unwrap();

        let dest = temp.path().join("dest");
        assert_eq!(copy_tree(&src, &dest).unwrap(), 1);

        let copied_leaf = dest.join(deepest.strip_prefix(&src).unwrap()).join("leaf");
        assert_eq!(fs::read(copied_leaf).unwrap(), b"leaf");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let result = copy_tree(&temp.path().join("missing"), &temp.path().join("dest"));
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_skips_inner_symlinks() {
        let temp = TempDir::new().unwrap();
        let outside = temp.path().join("outside.txt");
        fs::write(&outside, b"secret").unwrap();

        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("kept.txt"), b"ok").unwrap();
        std::os::unix::fs::symlink(&outside, src.join("link")).unwrap();

        let dest = temp.path().join("dest");
        assert_eq!(copy_tree(&src, &dest).unwrap(), 1);
        assert!(dest.join("kept.txt").exists());
        assert!(fs::symlink_metadata(dest.join("link")).is_err());
    }
}
