//! Tenant-scoped file store implementation
//!
//! [`FileStore`] owns the (canonical) storage base and hands out [`TenantFiles`] views, each
//! bound to one tenant root. Every operation on a view resolves its paths through
//! [`ResolvedPath`], so no operation can touch anything outside the tenant root.
//!
//! # Directories are implicit
//!
//! Directories are never declared up front. Listing, uploading into, or moving into a
//! directory creates it (and any missing parents) first. The tenant root itself is created the
//! same way, on first access or when the hosting account is provisioned.
//!
//! # Implementation Notes
//!
//! - Both types are cheap to clone and hold no open handles
//! - All I/O is blocking `std::fs`; async callers should run operations on a blocking pool
//! - Multi-step operations (ensure-then-list, recursive copy) are not atomic

use crate::copy::copy_tree;
use crate::entry::{DirectoryEntry, DownloadTarget, EntryKind, Listing, UploadPayload};
use crate::paths::ResolvedPath;
use crate::{io_context, FilesError, FilesResult};
use chrono::{DateTime, Utc};
use panel_types::SegmentName;
use panel_uuid::TenantId;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Shared file store rooted at a storage base directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Canonicalised storage base
    storage_base: PathBuf,
}

impl FileStore {
    /// Creates a store over an existing storage base directory.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidStorageBase`] if the directory does not exist, is not a
    /// directory, or cannot be canonicalised.
    pub fn new(storage_base: &Path) -> FilesResult<Self> {
        if !storage_base.exists() {
            return Err(FilesError::InvalidStorageBase(format!(
                "Directory does not exist: {}",
                storage_base.display()
            )));
        }

        if !storage_base.is_dir() {
            return Err(FilesError::InvalidStorageBase(format!(
                "Path is not a directory: {}",
                storage_base.display()
            )));
        }

        let storage_base = storage_base.canonicalize().map_err(|e| {
            FilesError::InvalidStorageBase(format!(
                "Cannot canonicalize path {}: {}",
                storage_base.display(),
                e
            ))
        })?;

        Ok(Self { storage_base })
    }

    /// Returns the canonical storage base.
    pub fn storage_base(&self) -> &Path {
        &self.storage_base
    }

    /// Returns the absolute root directory of `tenant` (which may not exist yet).
    pub fn tenant_root(&self, tenant: &TenantId) -> PathBuf {
        tenant.root_dir(&self.storage_base)
    }

    /// Returns a view scoped to `tenant`.
    pub fn tenant(&self, tenant: TenantId) -> TenantFiles {
        TenantFiles {
            root: self.tenant_root(&tenant),
            tenant,
        }
    }
}

/// File operations confined to one tenant root.
#[derive(Debug, Clone)]
pub struct TenantFiles {
    tenant: TenantId,
    root: PathBuf,
}

impl TenantFiles {
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Absolute tenant root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the tenant root if it does not exist yet.
    pub fn ensure_root(&self) -> FilesResult<PathBuf> {
        ensure_dir(&self.root)?;
        Ok(self.root.clone())
    }

    /// Resolves `relative` inside the tenant root.
    pub fn resolve(&self, relative: &str) -> FilesResult<ResolvedPath> {
        ResolvedPath::resolve(&self.root, relative)
    }

    /// Lists the directory at `relative`, creating it first if it is missing.
    ///
    /// Entries are returned directories first, then by name. Symlinks and special files are
    /// not listed, and entries that disappear between reading the directory and reading their
    /// metadata are skipped.
    ///
    /// # Errors
    ///
    /// - [`FilesError::PathTraversal`] if the path escapes the tenant root
    /// - [`FilesError::NotADirectory`] if the path is an existing file
    /// - [`FilesError::Io`] if the directory cannot be created or read
    pub fn list(&self, relative: &str) -> FilesResult<Listing> {
        let dir = self.resolve(relative)?;
        if dir.target().is_file() {
            return Err(FilesError::NotADirectory(dir.relative()));
        }
        ensure_dir(dir.target())?;

        let entries =
            fs::read_dir(dir.target()).map_err(|e| io_context(e, "read", dir.target()))?;

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_context(e, "read", dir.target()))?;
            let path = entry.path();

            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "entry vanished during listing");
                    continue;
                }
                Err(e) => return Err(io_context(e, "stat", &path)),
            };

            let kind = if metadata.is_dir() {
                EntryKind::Dir
            } else if metadata.is_file() {
                EntryKind::File
            } else {
                continue;
            };

            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .map_err(|e| io_context(e, "read modification time of", &path))?;

            items.push(DirectoryEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                size: match kind {
                    EntryKind::Dir => 0,
                    EntryKind::File => metadata.len(),
                },
                modified,
            });
        }

        items.sort_by(|a, b| {
            let rank = |kind: EntryKind| matches!(kind, EntryKind::File);
            rank(a.kind)
                .cmp(&rank(b.kind))
                .then_with(|| a.name.cmp(&b.name))
        });

        tracing::debug!(tenant = %self.tenant, path = %dir.relative(), count = items.len(), "listed directory");

        Ok(Listing {
            path: dir.relative(),
            items,
        })
    }

    /// Creates directory `name` under `relative_dir`, including missing parents.
    ///
    /// Succeeds if the directory already exists.
    ///
    /// # Errors
    ///
    /// - [`FilesError::InvalidName`] if `name` is empty or not a single segment
    /// - [`FilesError::PathTraversal`] if `relative_dir` escapes the tenant root
    /// - [`FilesError::NotADirectory`] if `relative_dir` is an existing file
    pub fn make_directory(&self, relative_dir: &str, name: &str) -> FilesResult<SegmentName> {
        let name = segment(name, "folder name")?;
        let parent = self.resolve(relative_dir)?;
        if parent.target().is_file() {
            return Err(FilesError::NotADirectory(parent.relative()));
        }
        let dir = parent.join(&name)?;
        ensure_dir(dir.target())?;

        tracing::debug!(tenant = %self.tenant, path = %dir.relative(), "created directory");
        Ok(name)
    }

    /// Stores an uploaded file as `relative_dir/file_name`, replacing any existing file.
    ///
    /// The target directory is created if needed. In-memory content is written directly;
    /// staged content is moved into place (copied, then removed, if a rename is not possible).
    ///
    /// # Errors
    ///
    /// - [`FilesError::InvalidName`] if `file_name` is not a single segment
    /// - [`FilesError::UnsupportedPayload`] if a staged file is missing or not a regular file
    /// - [`FilesError::IsADirectory`] if a directory already occupies the target name
    /// - [`FilesError::NotADirectory`] if `relative_dir` is an existing file
    pub fn save_upload(
        &self,
        relative_dir: &str,
        file_name: &str,
        payload: UploadPayload,
    ) -> FilesResult<SegmentName> {
        let name = segment(file_name, "file name")?;
        let dir = self.resolve(relative_dir)?;
        if dir.target().is_file() {
            return Err(FilesError::NotADirectory(dir.relative()));
        }
        let destination = dir.join(&name)?;

        if destination.target().is_dir() {
            return Err(FilesError::IsADirectory(destination.relative()));
        }

        let size = payload.memory_len();
        match payload {
            UploadPayload::Memory(bytes) => {
                ensure_dir(dir.target())?;
                fs::write(destination.target(), bytes)
                    .map_err(|e| io_context(e, "write", destination.target()))?;
            }
            UploadPayload::StagedFile(staged) => {
                if !staged.is_file() {
                    return Err(FilesError::UnsupportedPayload);
                }
                ensure_dir(dir.target())?;
                move_file(&staged, destination.target())?;
            }
        }

        tracing::debug!(tenant = %self.tenant, path = %destination.relative(), ?size, "stored upload");
        Ok(name)
    }

    /// Recursively deletes the file or directory at `relative`.
    ///
    /// Deleting something that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// - [`FilesError::PathRequired`] if `relative` is empty or resolves to the tenant root
    pub fn remove(&self, relative: &str) -> FilesResult<()> {
        let target = self.resolve_required(relative)?;

        let metadata = match fs::symlink_metadata(target.target()) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_context(e, "stat", target.target())),
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(target.target())
        } else {
            fs::remove_file(target.target())
        };

        match result {
            Ok(()) => {}
            // Removed concurrently.
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_context(e, "remove", target.target())),
        }

        tracing::debug!(tenant = %self.tenant, path = %target.relative(), "removed");
        Ok(())
    }

    /// Renames the entry at `relative` to `new_name` within the same parent directory.
    ///
    /// # Errors
    ///
    /// - [`FilesError::InvalidName`] if `new_name` is not a single segment
    /// - [`FilesError::PathRequired`] if `relative` is empty or the tenant root
    /// - [`FilesError::NotFound`] if the source does not exist
    pub fn rename(&self, relative: &str, new_name: &str) -> FilesResult<()> {
        let new_name = segment(new_name, "new name")?;
        let source = self.resolve_required(relative)?;
        require_exists(&source)?;

        let destination = source
            .sibling(&new_name)?
            .ok_or(FilesError::PathRequired)?;

        fs::rename(source.target(), destination.target())
            .map_err(|e| io_context(e, "rename", source.target()))?;

        tracing::debug!(
            tenant = %self.tenant,
            from = %source.relative(),
            to = %destination.relative(),
            "renamed"
        );
        Ok(())
    }

    /// Moves the entry at `from` into directory `to_dir`, keeping its name.
    ///
    /// `to_dir` is created if needed. An existing entry of the same name at the destination is
    /// replaced where the platform's rename allows it.
    ///
    /// # Errors
    ///
    /// - [`FilesError::PathRequired`] if `from` is empty or the tenant root
    /// - [`FilesError::NotFound`] if the source does not exist
    /// - [`FilesError::InvalidDestination`] if a directory would be moved into itself
    pub fn move_entry(&self, from: &str, to_dir: &str) -> FilesResult<()> {
        let Transfer {
            source,
            to_dir,
            destination,
        } = self.transfer_paths(from, to_dir)?;
        if source == destination {
            return Ok(());
        }

        ensure_dir(to_dir.target())?;
        fs::rename(source.target(), destination.target())
            .map_err(|e| io_context(e, "move", source.target()))?;

        tracing::debug!(
            tenant = %self.tenant,
            from = %source.relative(),
            to = %destination.relative(),
            "moved"
        );
        Ok(())
    }

    /// Copies the entry at `from` (file or whole directory tree) into directory `to_dir`,
    /// keeping its name.
    ///
    /// `to_dir` is created if needed. The copy is not transactional: if a file fails to copy,
    /// the operation stops and entries copied so far remain.
    ///
    /// # Errors
    ///
    /// - [`FilesError::PathRequired`] if `from` is empty or the tenant root
    /// - [`FilesError::NotFound`] if the source does not exist
    /// - [`FilesError::InvalidDestination`] if the copy would land on the source itself or
    ///   inside a directory being copied
    pub fn copy_entry(&self, from: &str, to_dir: &str) -> FilesResult<()> {
        let Transfer {
            source,
            to_dir,
            destination,
        } = self.transfer_paths(from, to_dir)?;
        if source == destination {
            return Err(FilesError::InvalidDestination(destination.relative()));
        }

        ensure_dir(to_dir.target())?;
        let copied = copy_tree(source.target(), destination.target())?;

        tracing::debug!(
            tenant = %self.tenant,
            from = %source.relative(),
            to = %destination.relative(),
            files = copied,
            "copied"
        );
        Ok(())
    }

    /// Resolves `relative` to an absolute location without touching it.
    ///
    /// The caller must check what is there before using it.
    ///
    /// # Errors
    ///
    /// - [`FilesError::PathRequired`] if `relative` is empty or the tenant root
    /// - [`FilesError::PathTraversal`] if it escapes the tenant root
    pub fn absolute_path_for(&self, relative: &str) -> FilesResult<PathBuf> {
        Ok(self.resolve_required(relative)?.target().to_path_buf())
    }

    /// Resolves `relative` for streaming to a client.
    ///
    /// # Errors
    ///
    /// As [`Self::absolute_path_for`], plus [`FilesError::NotFound`] if nothing is there and
    /// [`FilesError::IsADirectory`] if it is a directory.
    pub fn open_for_download(&self, relative: &str) -> FilesResult<DownloadTarget> {
        let target = self.resolve_required(relative)?;
        let metadata = match fs::metadata(target.target()) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FilesError::NotFound(target.relative()))
            }
            Err(e) => return Err(io_context(e, "stat", target.target())),
        };

        if metadata.is_dir() {
            return Err(FilesError::IsADirectory(target.relative()));
        }

        let file_name = target.file_name().ok_or(FilesError::PathRequired)?;
        Ok(DownloadTarget {
            path: target.target().to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }

    /// Resolves a path that must not be the tenant root.
    fn resolve_required(&self, relative: &str) -> FilesResult<ResolvedPath> {
        if relative.trim().is_empty() {
            return Err(FilesError::PathRequired);
        }
        let resolved = self.resolve(relative)?;
        if resolved.is_root() {
            return Err(FilesError::PathRequired);
        }
        Ok(resolved)
    }

    /// Shared validation for move and copy.
    fn transfer_paths(&self, from: &str, to_dir: &str) -> FilesResult<Transfer> {
        let source = self.resolve_required(from)?;
        require_exists(&source)?;

        let to_dir = self.resolve(to_dir)?;
        if to_dir.target().is_file() {
            return Err(FilesError::NotADirectory(to_dir.relative()));
        }

        let name = source
            .file_name()
            .ok_or(FilesError::PathRequired)
            .and_then(|name| segment(&name, "source name"))?;
        let destination = to_dir.join(&name)?;

        if source.target().is_dir() {
            if destination != source && destination.is_within(&source) {
                return Err(FilesError::InvalidDestination(to_dir.relative()));
            }
            // A symlinked directory is copied through its link, so compare where both lead.
            if is_symlink(&source)? {
                let linked = fs::canonicalize(source.target())
                    .map_err(|e| io_context(e, "canonicalize", source.target()))?;
                if canonical_prefix(to_dir.target())?.starts_with(&linked) {
                    return Err(FilesError::InvalidDestination(to_dir.relative()));
                }
            }
        }

        Ok(Transfer {
            source,
            to_dir,
            destination,
        })
    }
}

/// Resolved endpoints of a move or copy; `destination` is `to_dir/<source name>`.
struct Transfer {
    source: ResolvedPath,
    to_dir: ResolvedPath,
    destination: ResolvedPath,
}

/// Validates a single-segment name, mapping failures to [`FilesError::InvalidName`].
fn segment(name: &str, what: &str) -> FilesResult<SegmentName> {
    SegmentName::new(name).map_err(|e| FilesError::InvalidName(format!("invalid {}: {}", what, e)))
}

fn require_exists(path: &ResolvedPath) -> FilesResult<()> {
    match fs::symlink_metadata(path.target()) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(FilesError::NotFound(path.relative())),
        Err(e) => Err(io_context(e, "stat", path.target())),
    }
}

fn is_symlink(path: &ResolvedPath) -> FilesResult<bool> {
    fs::symlink_metadata(path.target())
        .map(|metadata| metadata.file_type().is_symlink())
        .map_err(|e| io_context(e, "stat", path.target()))
}

/// Canonicalises the deepest existing ancestor of `path` and re-appends the missing tail.
fn canonical_prefix(path: &Path) -> FilesResult<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(canonical) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(canonical, |acc: PathBuf, part| acc.join(part)));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name);
                        existing = parent;
                    }
                    _ => return Err(io_context(e, "canonicalize", path)),
                }
            }
            Err(e) => return Err(io_context(e, "canonicalize", existing)),
        }
    }
}

fn ensure_dir(path: &Path) -> FilesResult<()> {
    fs::create_dir_all(path).map_err(|e| io_context(e, "create directory", path))
}

/// Moves a staged file into place, falling back to copy-and-delete when the staging area is
/// on another filesystem.
fn move_file(staged: &Path, destination: &Path) -> FilesResult<()> {
    if fs::rename(staged, destination).is_ok() {
        return Ok(());
    }
    fs::copy(staged, destination).map_err(|e| io_context(e, "copy", staged))?;
    if let Err(e) = fs::remove_file(staged) {
        tracing::warn!(path = %staged.display(), error = %e, "failed to remove staged upload");
    }
    Ok(())
}
