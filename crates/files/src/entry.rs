//! Value types produced and consumed by the file store.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Kind of a listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry of a directory listing.
///
/// Produced on demand from the filesystem; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DirectoryEntry {
    /// Entry name (single segment)
    pub name: String,

    /// File or directory
    pub kind: EntryKind,

    /// Size in bytes; always 0 for directories
    pub size: u64,

    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Result of listing a directory.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Listing {
    /// Normalised tenant-relative path of the listed directory; empty for the root
    pub path: String,

    /// Entries, directories first, each group ordered by name
    pub items: Vec<DirectoryEntry>,
}

/// A file resolved for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Absolute location to stream from
    pub path: PathBuf,

    /// Suggested download name (final path segment)
    pub file_name: String,

    /// Size in bytes at the time of resolution
    pub size: u64,
}

/// Content of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPayload {
    /// Content held in memory
    Memory(Vec<u8>),

    /// Content already written to a staging file, which is moved into place
    StagedFile(PathBuf),
}

impl UploadPayload {
    /// Number of bytes in an in-memory payload; `None` for staged files.
    pub fn memory_len(&self) -> Option<usize> {
        match self {
            UploadPayload::Memory(bytes) => Some(bytes.len()),
            UploadPayload::StagedFile(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&EntryKind::Dir).unwrap(), "\"dir\"");
        assert_eq!(serde_json::to_string(&EntryKind::File).unwrap(), "\"file\"");
    }

    #[test]
    fn test_listing_serialisation_shape() {
        let listing = Listing {
            path: "photos".into(),
            items: vec![DirectoryEntry {
                name: "cat.png".into(),
                kind: EntryKind::File,
                size: 4,
                modified: "2024-01-01T00:00:00Z".parse().unwrap(),
            }],
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["path"], "photos");
        assert_eq!(json["items"][0]["name"], "cat.png");
        assert_eq!(json["items"][0]["kind"], "file");
        assert_eq!(json["items"][0]["size"], 4);
    }
}
