//! Resolution of tenant-relative paths
//!
//! Resolution happens in two steps:
//!
//! 1. **Lexical**: the caller's path is applied segment by segment to the absolute tenant root.
//!    `.` is dropped and `..` pops the previous component, exactly as a shell would resolve it.
//!    The result must be the root or a descendant, compared component-wise with
//!    [`Path::starts_with`] so that a sibling such as `users/<id>-2` never passes for
//!    `users/<id>`.
//! 2. **Physical**: the deepest part of the result that already exists on disk is
//!    canonicalised, and the canonical location must still lie under the canonical root. This
//!    is what stops a symlink planted inside the root from leading outside it.

use crate::{io_context, FilesError, FilesResult};
use panel_types::SegmentName;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// A tenant-relative path resolved to an absolute location inside the tenant root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    root: PathBuf,
    target: PathBuf,
}

impl ResolvedPath {
    /// Resolves `relative` against `root`.
    ///
    /// `root` must be absolute; [`crate::FileStore`] guarantees this by canonicalising the
    /// storage base at construction.
    ///
    /// # Errors
    ///
    /// - [`FilesError::PathTraversal`] if the path is absolute, carries a drive/UNC prefix,
    ///   or resolves outside `root` either lexically or through a symlink
    /// - [`FilesError::InvalidName`] if the path contains a NUL byte
    /// - [`FilesError::NotADirectory`] if an existing file stands in for an intermediate directory
    /// - [`FilesError::Io`] if canonicalisation fails for a reason other than absence
    pub fn resolve(root: &Path, relative: &str) -> FilesResult<Self> {
        if relative.contains('\0') {
            return Err(FilesError::InvalidName(
                "path must not contain NUL bytes".into(),
            ));
        }

        if relative.starts_with(['/', '\\']) {
            return Err(FilesError::PathTraversal(relative.to_owned()));
        }

        let mut target = root.to_path_buf();
        for segment in relative.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    target.pop();
                }
                other => {
                    if !is_plain_segment(other) {
                        return Err(FilesError::PathTraversal(relative.to_owned()));
                    }
                    target.push(other);
                }
            }
        }

        if !target.starts_with(root) {
            tracing::warn!(relative, "rejected path resolving outside tenant root");
            return Err(FilesError::PathTraversal(relative.to_owned()));
        }

        let resolved = Self {
            root: root.to_path_buf(),
            target,
        };
        resolved.confine(relative)?;
        Ok(resolved)
    }

    /// Returns the child `name` of this path, re-checked against the root.
    pub fn join(&self, name: &SegmentName) -> FilesResult<Self> {
        let child = Self {
            root: self.root.clone(),
            target: self.target.join(name),
        };
        child.confine(name.as_str())?;
        Ok(child)
    }

    /// Returns the sibling `name` of this path (same parent directory).
    ///
    /// Returns `None` for the root, which has no sibling inside the tenant.
    pub fn sibling(&self, name: &SegmentName) -> FilesResult<Option<Self>> {
        match self.parent() {
            Some(parent) => parent.join(name).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the parent of this path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        self.target.parent().map(|parent| Self {
            root: self.root.clone(),
            target: parent.to_path_buf(),
        })
    }

    /// Absolute tenant root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute resolved location.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// True if this path is the tenant root itself.
    pub fn is_root(&self) -> bool {
        self.target == self.root
    }

    /// Final path segment, or `None` for the root.
    pub fn file_name(&self) -> Option<String> {
        if self.is_root() {
            return None;
        }
        self.target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Normalised tenant-relative form using `/` separators; empty for the root.
    pub fn relative(&self) -> String {
        self.target
            .strip_prefix(&self.root)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_default()
    }

    /// True if `self` is `other` or lies beneath it.
    pub fn is_within(&self, other: &ResolvedPath) -> bool {
        self.target.starts_with(&other.target)
    }

    /// Verifies that the existing part of the target does not escape the root on disk.
    fn confine(&self, requested: &str) -> FilesResult<()> {
        let canonical_root = match fs::canonicalize(&self.root) {
            Ok(path) => path,
            // Nothing under a missing root can exist yet.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_context(e, "canonicalize", &self.root)),
        };

        let mut existing = self.target.as_path();
        loop {
            match fs::symlink_metadata(existing) {
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::NotFound => match existing.parent() {
                    Some(parent) if parent.starts_with(&self.root) => existing = parent,
                    _ => return Ok(()),
                },
                // A file sits where an intermediate directory should be.
                Err(e) if e.kind() == ErrorKind::NotADirectory => {
                    return Err(FilesError::NotADirectory(self.relative()));
                }
                Err(e) => return Err(io_context(e, "stat", existing)),
            }
        }

        let canonical = match fs::canonicalize(existing) {
            Ok(path) => path,
            // Dangling symlink: its destination cannot be checked, so refuse it.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(requested, "rejected path through dangling symlink");
                return Err(FilesError::PathTraversal(requested.to_owned()));
            }
            Err(e) => return Err(io_context(e, "canonicalize", existing)),
        };

        if !canonical.starts_with(&canonical_root) {
            tracing::warn!(requested, "rejected path escaping tenant root via symlink");
            return Err(FilesError::PathTraversal(requested.to_owned()));
        }

        Ok(())
    }
}

/// True if `segment` is exactly one normal path component on this platform.
fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
