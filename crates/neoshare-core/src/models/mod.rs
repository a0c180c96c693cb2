//! Domain models shared across the NeoShare client crates.

mod file;
mod user;
mod wire;

pub use file::{EntryKind, FileEntry, Namespace, ViewMode};
pub use user::{Role, UserIdentity};
pub use wire::{
    AvatarResponse, ContentResponse, ContentUpdate, CreateDirectoryRequest, CreateUserRequest,
    PreviewResponse, ProfileUpdate, RegisterRequest, TokenResponse,
};
