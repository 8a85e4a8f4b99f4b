//! Request and response bodies of the file manager API.
//!
//! Field names follow the browser client's camelCase conventions.

use panel_files::{DirectoryEntry, EntryKind, Listing};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OkRes {
    pub ok: bool,
}

impl OkRes {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DirectoryEntryRes {
    pub name: String,
    /// `"dir"` or `"file"`
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    /// Last modification, milliseconds since the Unix epoch
    pub mtime: i64,
}

impl From<DirectoryEntry> for DirectoryEntryRes {
    fn from(entry: DirectoryEntry) -> Self {
        let kind = match entry.kind {
            EntryKind::Dir => "dir",
            EntryKind::File => "file",
        };
        Self {
            name: entry.name,
            kind: kind.into(),
            size: entry.size,
            mtime: entry.modified.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListFilesRes {
    /// Listed directory relative to the tenant root; empty for the root
    pub path: String,
    pub items: Vec<DirectoryEntryRes>,
}

impl From<Listing> for ListFilesRes {
    fn from(listing: Listing) -> Self {
        Self {
            path: listing.path,
            items: listing.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Treats an explicit `null` like an absent field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Missing or null fields deserialize as empty strings so handlers can answer with a 400 message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MkdirReq {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MkdirRes {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadRes {
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameReq {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub new_name: String,
}

/// Body of both move and copy requests. An absent or null `toDir` means the tenant root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferReq {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub from: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub to_dir: String,
}

/// Query string of upload and mkdir requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirQuery {
    #[serde(default)]
    pub dir: String,
}
