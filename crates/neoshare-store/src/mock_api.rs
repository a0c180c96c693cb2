//! In-memory `FileApi` mock for store tests.
//!
//! Behavior is configured per endpoint; listing responses can carry an
//! artificial delay so tests can interleave slow and fast requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;

use neoshare_api_client::{FileApi, ProgressFn};
use neoshare_core::models::{
    ContentResponse, EntryKind, FileEntry, Namespace, PreviewResponse, UserIdentity,
};
use neoshare_core::{ClientError, ClientResult, RemotePath};

pub fn entry(id: i64, name: &str, kind: EntryKind) -> FileEntry {
    FileEntry {
        id,
        name: name.to_string(),
        path: "/".to_string(),
        kind,
        size: 100,
        mime_type: None,
        is_public: true,
        updated_at: Utc::now(),
        user_id: 1,
    }
}

type ListKey = (&'static str, String, Option<String>);

#[derive(Default)]
pub struct MockApi {
    me: Mutex<Option<ClientResult<UserIdentity>>>,
    me_calls: AtomicUsize,

    listings: Mutex<HashMap<ListKey, Vec<FileEntry>>>,
    list_delays: Mutex<HashMap<ListKey, Duration>>,
    list_errors: Mutex<HashMap<ListKey, String>>,
    list_calls: Mutex<Vec<ListKey>>,

    upload_failures: Mutex<HashMap<String, String>>,
    upload_calls: Mutex<Vec<(String, String)>>,
    upload_progress_steps: Mutex<Vec<u8>>,

    delete_error: Mutex<Option<String>>,
    delete_calls: AtomicUsize,

    contents: Mutex<HashMap<i64, String>>,
    previews: Mutex<HashMap<i64, String>>,
    downloads: Mutex<HashMap<i64, Vec<u8>>>,
    put_error: Mutex<Option<String>>,
    saved: Mutex<Vec<(i64, String)>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(namespace: Namespace, path: &RemotePath, search: Option<&str>) -> ListKey {
        (
            namespace.as_str(),
            path.to_string(),
            search.map(str::to_string),
        )
    }

    pub fn set_me(&self, result: ClientResult<UserIdentity>) {
        *self.me.lock().unwrap() = Some(result);
    }

    pub fn me_calls(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn set_listing(
        &self,
        namespace: Namespace,
        path: &str,
        search: Option<&str>,
        entries: Vec<FileEntry>,
    ) {
        let path = RemotePath::parse(path).unwrap();
        self.listings
            .lock()
            .unwrap()
            .insert(Self::key(namespace, &path, search), entries);
    }

    pub fn set_list_delay(
        &self,
        namespace: Namespace,
        path: &str,
        search: Option<&str>,
        delay: Duration,
    ) {
        let path = RemotePath::parse(path).unwrap();
        self.list_delays
            .lock()
            .unwrap()
            .insert(Self::key(namespace, &path, search), delay);
    }

    pub fn set_list_error(&self, namespace: Namespace, path: &str, message: &str) {
        let path = RemotePath::parse(path).unwrap();
        self.list_errors
            .lock()
            .unwrap()
            .insert(Self::key(namespace, &path, None), message.to_string());
    }

    pub fn clear_list_error(&self, namespace: Namespace, path: &str) {
        let path = RemotePath::parse(path).unwrap();
        self.list_errors
            .lock()
            .unwrap()
            .remove(&Self::key(namespace, &path, None));
    }

    pub fn list_calls(&self) -> Vec<ListKey> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn fail_upload(&self, filename: &str, message: &str) {
        self.upload_failures
            .lock()
            .unwrap()
            .insert(filename.to_string(), message.to_string());
    }

    pub fn upload_calls(&self) -> Vec<(String, String)> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn upload_progress_steps(&self) -> Vec<u8> {
        self.upload_progress_steps.lock().unwrap().clone()
    }

    pub fn fail_delete(&self, message: &str) {
        *self.delete_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn set_content(&self, id: i64, content: &str) {
        self.contents.lock().unwrap().insert(id, content.to_string());
    }

    pub fn set_preview(&self, id: i64, html: &str) {
        self.previews.lock().unwrap().insert(id, html.to_string());
    }

    pub fn set_download(&self, id: i64, data: Vec<u8>) {
        self.downloads.lock().unwrap().insert(id, data);
    }

    pub fn fail_put_content(&self, message: &str) {
        *self.put_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn saved(&self) -> Vec<(i64, String)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileApi for MockApi {
    async fn fetch_me(&self) -> ClientResult<UserIdentity> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        self.me
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(ClientError::Auth("no identity configured".to_string())))
    }

    async fn list_files(
        &self,
        namespace: Namespace,
        path: &RemotePath,
        search: Option<&str>,
    ) -> ClientResult<Vec<FileEntry>> {
        let key = Self::key(namespace, path, search);
        self.list_calls.lock().unwrap().push(key.clone());

        let delay = self.list_delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.list_errors.lock().unwrap().get(&key) {
            return Err(ClientError::Network(message.clone()));
        }
        Ok(self
            .listings
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_file(
        &self,
        _namespace: Namespace,
        path: &RemotePath,
        filename: &str,
        _data: Vec<u8>,
        on_progress: ProgressFn,
    ) -> ClientResult<FileEntry> {
        self.upload_calls
            .lock()
            .unwrap()
            .push((filename.to_string(), path.to_string()));

        for percent in [0u8, 50, 100] {
            on_progress(percent);
            self.upload_progress_steps.lock().unwrap().push(percent);
        }

        if let Some(message) = self.upload_failures.lock().unwrap().get(filename) {
            return Err(ClientError::Network(message.clone()));
        }
        Ok(entry(999, filename, EntryKind::File))
    }

    async fn create_directory(
        &self,
        _namespace: Namespace,
        _path: &RemotePath,
        name: &str,
    ) -> ClientResult<FileEntry> {
        Ok(entry(1000, name, EntryKind::Directory))
    }

    async fn delete_file(&self, _id: i64) -> ClientResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.delete_error.lock().unwrap().clone() {
            Some(message) => Err(ClientError::Network(message)),
            None => Ok(()),
        }
    }

    async fn download_file(&self, id: i64, _preview: bool) -> ClientResult<Bytes> {
        self.downloads
            .lock()
            .unwrap()
            .get(&id)
            .map(|d| Bytes::from(d.clone()))
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: "File not found".to_string(),
            })
    }

    async fn get_content(&self, id: i64) -> ClientResult<ContentResponse> {
        self.contents
            .lock()
            .unwrap()
            .get(&id)
            .map(|content| ContentResponse {
                content: content.clone(),
                mime_type: None,
            })
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: "File not found".to_string(),
            })
    }

    async fn put_content(&self, id: i64, content: &str) -> ClientResult<()> {
        if let Some(message) = self.put_error.lock().unwrap().clone() {
            return Err(ClientError::Network(message));
        }
        self.saved.lock().unwrap().push((id, content.to_string()));
        self.contents.lock().unwrap().insert(id, content.to_string());
        Ok(())
    }

    async fn get_preview(&self, id: i64) -> ClientResult<PreviewResponse> {
        self.previews
            .lock()
            .unwrap()
            .get(&id)
            .map(|html| PreviewResponse { html: html.clone() })
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: "File not found".to_string(),
            })
    }
}
