use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public vs private file scope. Each namespace has an independent root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Public,
    Private,
}

impl Namespace {
    /// Path segment used by the listing endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Public => "public",
            Namespace::Private => "private",
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Namespace::Public)
    }
}

/// Listing presentation mode. Client-side only, never sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// A single listing entry as returned by the server.
///
/// Immutable snapshot: the client never mutates an entry in place, it
/// replaces the whole listing on refresh. `path` is the directory
/// containing the entry, not the entry's own full path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: i64,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: i64,
    pub mime_type: Option<String>,
    pub is_public: bool,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
}

impl FileEntry {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}
