//! File navigation and upload store
//!
//! Owns the browsing state for one namespace at a time: current path,
//! listing, search, view mode, and upload progress. Listing responses
//! carry a monotonic ticket so a slow response for an old location can
//! never overwrite the listing of the current one. Search is debounced;
//! uploads run strictly sequentially with a trailing linger on the
//! `uploading` flag so back-to-back batches don't flicker it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;

use neoshare_api_client::{FileApi, ProgressFn};
use neoshare_core::models::{FileEntry, Namespace, ViewMode};
use neoshare_core::{ClientConfig, ClientError, ClientResult, RemotePath};

/// Read-only view of the navigation state.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub namespace: Namespace,
    pub current_path: RemotePath,
    pub entries: Vec<FileEntry>,
    pub view_mode: ViewMode,
    pub search_query: Option<String>,
    pub loading: bool,
    pub uploading: bool,
    pub upload_progress: u8,
}

impl Default for NavigationState {
    fn default() -> Self {
        NavigationState {
            namespace: Namespace::Public,
            current_path: RemotePath::root(),
            entries: Vec::new(),
            view_mode: ViewMode::List,
            search_query: None,
            loading: false,
            uploading: false,
            upload_progress: 0,
        }
    }
}

/// One file queued for upload. `relative_folder` preserves the folder
/// structure of a directory drop, relative to the current path.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub filename: String,
    pub data: Vec<u8>,
    pub relative_folder: Option<String>,
}

impl UploadJob {
    pub fn file(filename: &str, data: Vec<u8>) -> Self {
        UploadJob {
            filename: filename.to_string(),
            data,
            relative_folder: None,
        }
    }

    fn resolve_target(&self, base: &RemotePath) -> ClientResult<RemotePath> {
        let mut target = base.clone();
        if let Some(folder) = &self.relative_folder {
            for segment in folder.split('/').filter(|s| !s.is_empty()) {
                target = target.child(segment)?;
            }
        }
        Ok(target)
    }
}

/// Per-file result of a batch upload. A failed file never aborts the
/// rest of the batch.
#[derive(Debug)]
pub struct UploadOutcome {
    pub filename: String,
    pub error: Option<ClientError>,
}

impl UploadOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct FileStore {
    api: Arc<dyn FileApi>,
    state: Mutex<NavigationState>,
    // Tickets for the anti-stale guards. A listing response or upload
    // side effect applies only while its ticket is still the latest.
    list_seq: AtomicU64,
    upload_seq: AtomicU64,
    pending_search: Mutex<Option<JoinHandle<()>>>,
    search_debounce: Duration,
    upload_linger: Duration,
}

impl FileStore {
    pub fn new(api: Arc<dyn FileApi>, config: &ClientConfig) -> Self {
        Self::with_namespace(api, config, Namespace::Public)
    }

    /// Create a store already pointed at a namespace, without issuing
    /// a listing. One-shot callers start here instead of paying the
    /// extra root fetch of `set_namespace`.
    pub fn with_namespace(
        api: Arc<dyn FileApi>,
        config: &ClientConfig,
        namespace: Namespace,
    ) -> Self {
        FileStore {
            api,
            state: Mutex::new(NavigationState {
                namespace,
                ..NavigationState::default()
            }),
            list_seq: AtomicU64::new(0),
            upload_seq: AtomicU64::new(0),
            pending_search: Mutex::new(None),
            search_debounce: config.search_debounce,
            upload_linger: config.upload_linger,
        }
    }

    fn lock(&self) -> MutexGuard<'_, NavigationState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> NavigationState {
        self.lock().clone()
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.lock().view_mode = mode;
    }

    /// Fetch the listing for the given location. Takes a ticket up
    /// front; if a newer request starts before this one resolves, the
    /// response is dropped on the floor. The location and filter commit
    /// together with the entries on success; a failed fetch leaves the
    /// previous location and entries visible so the move can be retried.
    async fn load(&self, namespace: Namespace, path: RemotePath, search: Option<String>) {
        let ticket = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().loading = true;

        let result = self.api.list_files(namespace, &path, search.as_deref()).await;

        let mut state = self.lock();
        if self.list_seq.load(Ordering::SeqCst) != ticket {
            return;
        }
        match result {
            Ok(entries) => {
                state.current_path = path;
                state.search_query = search;
                state.entries = entries;
                state.loading = false;
            }
            Err(e) => {
                tracing::warn!("Failed to list {path}: {e}");
                state.loading = false;
            }
        }
    }

    /// Re-fetch the listing for the current location, keeping any
    /// active search filter.
    pub async fn refresh(&self) {
        let (namespace, path, search) = {
            let state = self.lock();
            (
                state.namespace,
                state.current_path.clone(),
                state.search_query.clone(),
            )
        };
        self.load(namespace, path, search).await;
    }

    /// Enter a directory. No-op if it is already the current path.
    /// Clears any active search filter. The path only changes once the
    /// listing arrives, so a failed move can be retried.
    pub async fn navigate(&self, path: RemotePath) {
        let namespace = {
            let state = self.lock();
            if state.current_path == path {
                return;
            }
            state.namespace
        };
        self.load(namespace, path, None).await;
    }

    /// Move to the parent directory. No-op at the root.
    pub async fn go_back(&self) {
        let parent = self.lock().current_path.parent();
        if let Some(parent) = parent {
            self.navigate(parent).await;
        }
    }

    /// Switch between the public and private trees. Resets the path to
    /// the root of the new namespace. No-op if unchanged.
    pub async fn set_namespace(&self, namespace: Namespace) {
        {
            let mut state = self.lock();
            if state.namespace == namespace {
                return;
            }
            state.namespace = namespace;
            state.current_path = RemotePath::root();
            state.search_query = None;
        }
        self.load(namespace, RemotePath::root(), None).await;
    }

    /// Filter the current directory by name. The query is reflected in
    /// the state immediately; the fetch is debounced, and retyping
    /// before the timer fires cancels the previous fetch. An empty
    /// query clears the filter and re-issues a plain listing at once.
    pub async fn search(self: &Arc<Self>, query: &str) {
        if let Some(handle) = self
            .pending_search
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }

        if query.is_empty() {
            let (namespace, path) = {
                let mut state = self.lock();
                state.search_query = None;
                (state.namespace, state.current_path.clone())
            };
            self.load(namespace, path, None).await;
            return;
        }

        let query = query.to_string();
        self.lock().search_query = Some(query.clone());

        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(store.search_debounce).await;
            let (namespace, path) = {
                let state = store.lock();
                (state.namespace, state.current_path.clone())
            };
            store.load(namespace, path, Some(query)).await;
        });
        *self
            .pending_search
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(handle);
    }

    /// Wait out a pending debounced search and its fetch. One-shot
    /// callers use this to read the filtered listing right after
    /// `search`.
    pub async fn flush_search(&self) {
        let handle = self
            .pending_search
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Upload a batch of files, strictly in order. The listing is
    /// refreshed after each successful file so progress is visible; a
    /// failed file is recorded and the batch continues. The `uploading`
    /// flag stays set for a short linger after the last file, unless a
    /// newer batch has started by then.
    pub async fn upload_batch(self: &Arc<Self>, jobs: Vec<UploadJob>) -> Vec<UploadOutcome> {
        if jobs.is_empty() {
            return Vec::new();
        }
        let seq = self.upload_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            state.uploading = true;
            state.upload_progress = 0;
        }

        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in jobs {
            let (namespace, base) = {
                let state = self.lock();
                (state.namespace, state.current_path.clone())
            };
            let target = match job.resolve_target(&base) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!("Skipping {}: {e}", job.filename);
                    outcomes.push(UploadOutcome {
                        filename: job.filename,
                        error: Some(e),
                    });
                    continue;
                }
            };

            let progress_store = Arc::clone(self);
            let on_progress: ProgressFn = Arc::new(move |percent| {
                if progress_store.upload_seq.load(Ordering::SeqCst) == seq {
                    progress_store.lock().upload_progress = percent;
                }
            });

            let UploadJob { filename, data, .. } = job;
            match self
                .api
                .upload_file(namespace, &target, &filename, data, on_progress)
                .await
            {
                Ok(_) => {
                    outcomes.push(UploadOutcome {
                        filename,
                        error: None,
                    });
                    self.refresh().await;
                }
                Err(e) => {
                    tracing::warn!("Upload of {filename} failed: {e}");
                    outcomes.push(UploadOutcome {
                        filename,
                        error: Some(e),
                    });
                }
            }
        }

        let store = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(store.upload_linger).await;
            if store.upload_seq.load(Ordering::SeqCst) == seq {
                store.lock().uploading = false;
            }
        });
        outcomes
    }

    /// Create a directory under the current path and refresh.
    pub async fn create_folder(&self, name: &str) -> ClientResult<()> {
        let (namespace, path) = {
            let state = self.lock();
            (state.namespace, state.current_path.clone())
        };
        self.api.create_directory(namespace, &path, name).await?;
        self.refresh().await;
        Ok(())
    }

    /// Delete an entry by id and refresh. On failure the listing is
    /// left untouched.
    pub async fn delete_entry(&self, id: i64) -> ClientResult<()> {
        self.api.delete_file(id).await?;
        self.refresh().await;
        Ok(())
    }

    /// Fetch the raw bytes of a file. Does not touch navigation state.
    pub async fn download_entry(&self, id: i64) -> ClientResult<Bytes> {
        self.api.download_file(id, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_api::{entry, MockApi};
    use neoshare_core::models::EntryKind;
    use std::path::PathBuf;

    fn config() -> ClientConfig {
        ClientConfig {
            api_url: "http://localhost:8000/api".to_string(),
            credentials_path: PathBuf::from("/tmp/unused.json"),
            editor_url: "http://localhost:8888".to_string(),
            editor_token: String::new(),
            search_debounce: Duration::from_millis(500),
            upload_linger: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(60),
        }
    }

    fn store(api: Arc<MockApi>) -> Arc<FileStore> {
        Arc::new(FileStore::new(api, &config()))
    }

    fn path(raw: &str) -> RemotePath {
        RemotePath::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn navigate_fetches_and_go_back_returns() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Public,
            "/docs",
            None,
            vec![entry(1, "a.txt", EntryKind::File)],
        );
        api.set_listing(
            Namespace::Public,
            "/",
            None,
            vec![entry(2, "docs", EntryKind::Directory)],
        );
        let store = store(api.clone());

        store.navigate(path("/docs")).await;
        let state = store.snapshot();
        assert_eq!(state.current_path.to_string(), "/docs");
        assert_eq!(state.entries[0].name, "a.txt");
        assert!(!state.loading);

        store.go_back().await;
        let state = store.snapshot();
        assert!(state.current_path.is_root());
        assert_eq!(state.entries[0].name, "docs");

        // Already at the root, nothing to do.
        let calls = api.list_calls().len();
        store.go_back().await;
        assert_eq!(api.list_calls().len(), calls);
    }

    #[tokio::test]
    async fn navigate_to_current_path_is_a_no_op() {
        let api = Arc::new(MockApi::new());
        let store = store(api.clone());
        store.navigate(path("/docs")).await;
        let calls = api.list_calls().len();
        store.navigate(path("/docs")).await;
        assert_eq!(api.list_calls().len(), calls);
    }

    #[tokio::test]
    async fn switching_namespace_resets_to_root() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Private,
            "/",
            None,
            vec![entry(3, "secret.txt", EntryKind::File)],
        );
        let store = store(api.clone());
        store.navigate(path("/docs/deep")).await;

        store.set_namespace(Namespace::Private).await;
        let state = store.snapshot();
        assert_eq!(state.namespace, Namespace::Private);
        assert!(state.current_path.is_root());
        assert_eq!(state.entries[0].name, "secret.txt");

        // Same namespace again: no fetch.
        let calls = api.list_calls().len();
        store.set_namespace(Namespace::Private).await;
        assert_eq!(api.list_calls().len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_listing_never_overwrites_a_newer_one() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Public,
            "/slow",
            None,
            vec![entry(1, "old.txt", EntryKind::File)],
        );
        api.set_list_delay(
            Namespace::Public,
            "/slow",
            None,
            Duration::from_millis(100),
        );
        api.set_listing(
            Namespace::Public,
            "/fast",
            None,
            vec![entry(2, "new.txt", EntryKind::File)],
        );
        let store = store(api.clone());

        let slow = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.navigate(path("/slow")).await })
        };
        tokio::task::yield_now().await;

        store.navigate(path("/fast")).await;
        assert_eq!(store.snapshot().entries[0].name, "new.txt");

        slow.await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.current_path.to_string(), "/fast");
        assert_eq!(state.entries[0].name, "new.txt");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn failed_navigate_keeps_location_and_can_be_retried() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Public,
            "/docs",
            None,
            vec![entry(1, "a.txt", EntryKind::File)],
        );
        api.set_list_error(Namespace::Public, "/flaky", "connection reset");
        let store = store(api.clone());

        store.navigate(path("/docs")).await;
        store.navigate(path("/flaky")).await;

        // The failed move leaves the previous location fully intact.
        let state = store.snapshot();
        assert_eq!(state.current_path.to_string(), "/docs");
        assert_eq!(state.entries[0].name, "a.txt");
        assert!(!state.loading);

        // Once the server recovers, the same move goes through.
        api.clear_list_error(Namespace::Public, "/flaky");
        api.set_listing(
            Namespace::Public,
            "/flaky",
            None,
            vec![entry(9, "fresh.txt", EntryKind::File)],
        );
        store.navigate(path("/flaky")).await;
        let state = store.snapshot();
        assert_eq!(state.current_path.to_string(), "/flaky");
        assert_eq!(state.entries[0].name, "fresh.txt");
    }

    #[tokio::test(start_paused = true)]
    async fn search_is_debounced_and_retyping_cancels() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Public,
            "/",
            Some("report"),
            vec![entry(1, "report.pdf", EntryKind::File)],
        );
        let store = store(api.clone());

        store.search("rep").await;
        store.search("repo").await;
        store.search("report").await;
        assert_eq!(store.snapshot().search_query.as_deref(), Some("report"));

        tokio::time::sleep(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;

        let searched: Vec<_> = api
            .list_calls()
            .into_iter()
            .filter_map(|(_, _, search)| search)
            .collect();
        assert_eq!(searched, vec!["report".to_string()]);
        assert_eq!(store.snapshot().entries[0].name, "report.pdf");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_query_clears_filter_immediately() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Public,
            "/",
            None,
            vec![
                entry(1, "a.txt", EntryKind::File),
                entry(2, "b.txt", EntryKind::File),
            ],
        );
        let store = store(api.clone());

        store.search("a").await;
        store.search("").await;

        let state = store.snapshot();
        assert!(state.search_query.is_none());
        assert_eq!(state.entries.len(), 2);

        // The debounced fetch for "a" was cancelled.
        tokio::time::sleep(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;
        let searched: Vec<_> = api
            .list_calls()
            .into_iter()
            .filter_map(|(_, _, search)| search)
            .collect();
        assert!(searched.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn upload_batch_runs_sequentially_and_lingers() {
        let api = Arc::new(MockApi::new());
        let store = store(api.clone());

        let outcomes = store
            .upload_batch(vec![
                UploadJob::file("a.txt", vec![1]),
                UploadJob::file("b.txt", vec![2]),
            ])
            .await;

        assert!(outcomes.iter().all(UploadOutcome::is_ok));
        let calls = api.upload_calls();
        assert_eq!(calls[0].0, "a.txt");
        assert_eq!(calls[1].0, "b.txt");

        // One refresh per successful file.
        assert_eq!(api.list_calls().len(), 2);

        // The flag lingers past the batch, then clears.
        let state = store.snapshot();
        assert!(state.uploading);
        assert_eq!(state.upload_progress, 100);
        tokio::time::sleep(Duration::from_millis(1100)).await;
        tokio::task::yield_now().await;
        assert!(!store.snapshot().uploading);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_upload_does_not_abort_the_batch() {
        let api = Arc::new(MockApi::new());
        api.fail_upload("bad.txt", "disk full");
        let store = store(api.clone());

        let outcomes = store
            .upload_batch(vec![
                UploadJob::file("bad.txt", vec![1]),
                UploadJob::file("good.txt", vec![2]),
            ])
            .await;

        assert!(!outcomes[0].is_ok());
        assert!(outcomes[1].is_ok());
        assert_eq!(api.upload_calls().len(), 2);
        // Only the successful file triggered a refresh.
        assert_eq!(api.list_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn folder_drop_resolves_relative_target() {
        let api = Arc::new(MockApi::new());
        let store = store(api.clone());
        store.navigate(path("/docs")).await;

        let job = UploadJob {
            filename: "notes.md".to_string(),
            data: vec![1],
            relative_folder: Some("project/2026".to_string()),
        };
        let outcomes = store.upload_batch(vec![job]).await;

        assert!(outcomes[0].is_ok());
        assert_eq!(api.upload_calls()[0].1, "/docs/project/2026");
    }

    #[tokio::test(start_paused = true)]
    async fn traversal_in_relative_folder_is_rejected() {
        let api = Arc::new(MockApi::new());
        let store = store(api.clone());

        let job = UploadJob {
            filename: "evil.txt".to_string(),
            data: vec![1],
            relative_folder: Some("../outside".to_string()),
        };
        let outcomes = store.upload_batch(vec![job]).await;

        assert!(matches!(
            outcomes[0].error,
            Some(ClientError::Validation(_))
        ));
        assert!(api.upload_calls().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_leaves_listing_untouched() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Public,
            "/",
            None,
            vec![entry(1, "keep.txt", EntryKind::File)],
        );
        let store = store(api.clone());
        store.refresh().await;
        let calls = api.list_calls().len();

        api.fail_delete("forbidden");
        assert!(store.delete_entry(1).await.is_err());

        assert_eq!(api.delete_calls(), 1);
        assert_eq!(api.list_calls().len(), calls);
        assert_eq!(store.snapshot().entries[0].name, "keep.txt");
    }

    #[tokio::test]
    async fn create_folder_refreshes_listing() {
        let api = Arc::new(MockApi::new());
        let store = store(api.clone());
        store.create_folder("reports").await.unwrap();
        assert_eq!(api.list_calls().len(), 1);
    }

    #[tokio::test]
    async fn store_can_start_in_the_private_namespace() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Private,
            "/",
            None,
            vec![entry(3, "secret.txt", EntryKind::File)],
        );
        let store = Arc::new(FileStore::with_namespace(
            api.clone(),
            &config(),
            Namespace::Private,
        ));

        // No fetch until the caller asks for one.
        assert!(api.list_calls().is_empty());
        store.refresh().await;

        let state = store.snapshot();
        assert_eq!(state.namespace, Namespace::Private);
        assert_eq!(state.entries[0].name, "secret.txt");
    }

    #[tokio::test(start_paused = true)]
    async fn flush_search_waits_for_the_debounced_fetch() {
        let api = Arc::new(MockApi::new());
        api.set_listing(
            Namespace::Public,
            "/",
            Some("report"),
            vec![entry(1, "report.pdf", EntryKind::File)],
        );
        let store = store(api.clone());

        store.search("report").await;
        store.flush_search().await;

        let state = store.snapshot();
        assert_eq!(state.entries[0].name, "report.pdf");
        assert_eq!(state.search_query.as_deref(), Some("report"));
    }

    #[tokio::test]
    async fn download_does_not_touch_navigation() {
        let api = Arc::new(MockApi::new());
        api.set_download(7, b"bytes".to_vec());
        let store = store(api.clone());

        let data = store.download_entry(7).await.unwrap();
        assert_eq!(&data[..], b"bytes");
        assert!(api.list_calls().is_empty());
    }
}
