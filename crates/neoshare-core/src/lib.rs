//! NeoShare Core Library
//!
//! This crate provides the domain models, remote-path value type, preview
//! classification, notebook document model, error types, and configuration
//! shared across all NeoShare client components.

pub mod config;
pub mod error;
pub mod models;
pub mod notebook;
pub mod path;
pub mod preview;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use models::{
    EntryKind, FileEntry, Namespace, Role, UserIdentity, ViewMode,
};
pub use notebook::{Cell, CellOutput, CellSource, Notebook};
pub use path::RemotePath;
pub use preview::{can_edit, PreviewMode};
