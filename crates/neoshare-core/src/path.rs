//! Remote path value type
//!
//! Server-side paths are always absolute and slash-rooted. `RemotePath`
//! normalizes on construction so the rest of the client never has to
//! reason about trailing slashes, empty segments, or the `"/"` vs `""`
//! ambiguity at the root.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// An absolute, normalized path in the remote file tree.
///
/// Invariants: always starts with `/`; no trailing slash except at the
/// root; no empty, `.` or `..` segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    /// The root directory `/`.
    pub fn root() -> Self {
        RemotePath { segments: Vec::new() }
    }

    /// Parse and normalize a slash-separated path. Relative paths are
    /// treated as rooted; `..` and `.` segments are rejected.
    pub fn parse(raw: &str) -> ClientResult<Self> {
        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(ClientError::Validation(format!(
                        "Path must not contain '..': {raw}"
                    )))
                }
                name => segments.push(name.to_string()),
            }
        }
        Ok(RemotePath { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a single child segment. Slashes in `name` are rejected.
    pub fn child(&self, name: &str) -> ClientResult<Self> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(ClientError::Validation(format!(
                "Invalid path segment: {name:?}"
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(RemotePath { segments })
    }

    /// The containing directory, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(RemotePath { segments })
    }

    /// The last segment, or `None` at the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl Default for RemotePath {
    fn default() -> Self {
        RemotePath::root()
    }
}

impl TryFrom<String> for RemotePath {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RemotePath::parse(&value)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_trailing_and_duplicate_slashes() {
        assert_eq!(RemotePath::parse("/docs/").unwrap().to_string(), "/docs");
        assert_eq!(
            RemotePath::parse("//docs///img").unwrap().to_string(),
            "/docs/img"
        );
        assert_eq!(RemotePath::parse("docs").unwrap().to_string(), "/docs");
    }

    #[test]
    fn parse_root_forms() {
        assert!(RemotePath::parse("/").unwrap().is_root());
        assert!(RemotePath::parse("").unwrap().is_root());
        assert_eq!(RemotePath::parse("/").unwrap().to_string(), "/");
    }

    #[test]
    fn parse_rejects_parent_traversal() {
        assert!(RemotePath::parse("/a/../b").is_err());
    }

    #[test]
    fn parent_terminates_at_root() {
        let mut path = RemotePath::parse("/a/b/c").unwrap();
        let mut hops = 0;
        while let Some(parent) = path.parent() {
            path = parent;
            hops += 1;
        }
        assert_eq!(hops, 3);
        assert!(path.is_root());
        assert!(path.parent().is_none());
    }

    #[test]
    fn child_builds_and_validates() {
        let docs = RemotePath::root().child("docs").unwrap();
        assert_eq!(docs.to_string(), "/docs");
        assert_eq!(docs.file_name(), Some("docs"));
        assert!(RemotePath::root().child("a/b").is_err());
        assert!(RemotePath::root().child("..").is_err());
        assert!(RemotePath::root().child("").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let path: RemotePath = serde_json::from_str("\"/docs/img/\"").unwrap();
        assert_eq!(path.to_string(), "/docs/img");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"/docs/img\"");
    }
}
