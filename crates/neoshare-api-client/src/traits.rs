//! API abstraction trait
//!
//! The state stores talk to the backend through this trait rather than
//! the concrete `ApiClient`, so their state machines can be tested
//! against an in-memory mock.

use async_trait::async_trait;
use bytes::Bytes;

use neoshare_core::models::{ContentResponse, FileEntry, Namespace, PreviewResponse, UserIdentity};
use neoshare_core::{ClientResult, RemotePath};

use crate::progress::ProgressFn;

/// The subset of the REST API the stores and the preview dispatcher use.
#[async_trait]
pub trait FileApi: Send + Sync {
    /// Bearer-authenticated identity lookup; 401 on an invalid token.
    async fn fetch_me(&self) -> ClientResult<UserIdentity>;

    /// Directory listing for a namespace, optionally filtered by a
    /// search query (a search ignores `path` on the server side).
    async fn list_files(
        &self,
        namespace: Namespace,
        path: &RemotePath,
        search: Option<&str>,
    ) -> ClientResult<Vec<FileEntry>>;

    /// Multipart upload into `path`. `on_progress` receives monotonic
    /// 0-100 percent values for this one job.
    async fn upload_file(
        &self,
        namespace: Namespace,
        path: &RemotePath,
        filename: &str,
        data: Vec<u8>,
        on_progress: ProgressFn,
    ) -> ClientResult<FileEntry>;

    async fn create_directory(
        &self,
        namespace: Namespace,
        path: &RemotePath,
        name: &str,
    ) -> ClientResult<FileEntry>;

    async fn delete_file(&self, id: i64) -> ClientResult<()>;

    /// Binary download. `preview` selects the inline-disposition variant.
    async fn download_file(&self, id: i64, preview: bool) -> ClientResult<Bytes>;

    async fn get_content(&self, id: i64) -> ClientResult<ContentResponse>;

    async fn put_content(&self, id: i64, content: &str) -> ClientResult<()>;

    /// Server-rendered preview HTML (notebooks).
    async fn get_preview(&self, id: i64) -> ClientResult<PreviewResponse>;
}
