//! Client-side state stores for NeoShare.
//!
//! Two explicitly-owned state containers (auth session, file navigation/
//! upload) plus the per-file preview dispatcher. All writes funnel through
//! named operations; consumers read immutable snapshots. Single-owner,
//! single-writer: no ambient globals.

pub mod files;
pub mod preview;
pub mod session;

#[cfg(test)]
mod mock_api;

pub use files::{FileStore, NavigationState, UploadJob, UploadOutcome};
pub use preview::{PreviewPhase, PreviewSession};
pub use session::{SessionSnapshot, SessionStore};
