//! Domain methods for the NeoShare API client.
//!
//! Response types live in `neoshare_core::models`. Methods used by the
//! state stores are also exposed through the `FileApi` trait; the
//! account/admin endpoints are plain inherent methods.

use async_trait::async_trait;
use bytes::Bytes;

use neoshare_core::models::{
    AvatarResponse, ContentResponse, ContentUpdate, CreateDirectoryRequest, CreateUserRequest,
    FileEntry, Namespace, PreviewResponse, ProfileUpdate, RegisterRequest, TokenResponse,
    UserIdentity,
};
use neoshare_core::{ClientError, ClientResult, RemotePath};

use crate::progress::{ProgressBody, ProgressFn};
use crate::traits::FileApi;
use crate::ApiClient;

impl ApiClient {
    /// Exchange username/password for a token. Form-encoded per the
    /// OAuth2 password flow. Does not persist anything; the session
    /// store owns persistence.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse> {
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        self.post_form(
            "/auth/login",
            &[("username", username), ("password", password)],
        )
        .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserIdentity> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        self.post_json("/auth/register", request).await
    }

    /// Download URL for a file, with the inline-preview variant.
    pub fn download_url(&self, id: i64, preview: bool) -> String {
        if preview {
            self.build_url(&format!("/files/download/{id}?preview=true"))
        } else {
            self.build_url(&format!("/files/download/{id}"))
        }
    }

    // ---- admin / account endpoints ----

    pub async fn list_users(&self) -> ClientResult<Vec<UserIdentity>> {
        self.get("/users/", &[]).await
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> ClientResult<UserIdentity> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        self.post_json("/users/", request).await
    }

    pub async fn delete_user(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/users/{id}")).await
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> ClientResult<UserIdentity> {
        self.put_json(&format!("/users/{user_id}"), update).await
    }

    /// Upload a new avatar image. The server persists the resulting URL
    /// on the profile immediately.
    pub async fn upload_avatar(
        &self,
        filename: &str,
        data: Vec<u8>,
    ) -> ClientResult<AvatarResponse> {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        self.post_multipart("/users/avatar", form).await
    }
}

#[async_trait]
impl FileApi for ApiClient {
    async fn fetch_me(&self) -> ClientResult<UserIdentity> {
        self.get("/auth/me", &[]).await
    }

    async fn list_files(
        &self,
        namespace: Namespace,
        path: &RemotePath,
        search: Option<&str>,
    ) -> ClientResult<Vec<FileEntry>> {
        let endpoint = format!("/files/list/{}", namespace.as_str());
        let mut query = vec![("path", path.to_string())];
        if let Some(q) = search {
            query.push(("search", q.to_string()));
        }
        self.get(&endpoint, &query).await
    }

    async fn upload_file(
        &self,
        namespace: Namespace,
        path: &RemotePath,
        filename: &str,
        data: Vec<u8>,
        on_progress: ProgressFn,
    ) -> ClientResult<FileEntry> {
        if filename.is_empty() {
            return Err(ClientError::Validation("Filename is required".to_string()));
        }
        let length = data.len() as u64;
        let body = reqwest::Body::wrap_stream(ProgressBody::new(data, on_progress));
        let part = reqwest::multipart::Part::stream_with_length(body, length)
            .file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("path", path.to_string())
            .text("is_public", namespace.is_public().to_string());
        self.post_multipart("/files/upload", form).await
    }

    async fn create_directory(
        &self,
        namespace: Namespace,
        path: &RemotePath,
        name: &str,
    ) -> ClientResult<FileEntry> {
        if name.is_empty() {
            return Err(ClientError::Validation(
                "Directory name is required".to_string(),
            ));
        }
        let request = CreateDirectoryRequest {
            name: name.to_string(),
            path: path.to_string(),
            is_public: namespace.is_public(),
        };
        self.post_json("/files/directory", &request).await
    }

    async fn delete_file(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/files/{id}")).await
    }

    async fn download_file(&self, id: i64, preview: bool) -> ClientResult<Bytes> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if preview {
            query.push(("preview", "true".to_string()));
        }
        self.get_bytes(&format!("/files/download/{id}"), &query)
            .await
    }

    async fn get_content(&self, id: i64) -> ClientResult<ContentResponse> {
        self.get(&format!("/files/content/{id}"), &[]).await
    }

    async fn put_content(&self, id: i64, content: &str) -> ClientResult<()> {
        let _: serde_json::Value = self
            .put_json(
                &format!("/files/content/{id}"),
                &ContentUpdate {
                    content: content.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    async fn get_preview(&self, id: i64) -> ClientResult<PreviewResponse> {
        self.get(&format!("/files/preview/{id}"), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCredentialStore;
    use neoshare_core::ClientConfig;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    fn client() -> ApiClient {
        let config = ClientConfig {
            api_url: "http://localhost:8000/api".to_string(),
            credentials_path: PathBuf::from("/tmp/unused.json"),
            editor_url: "http://localhost:8888".to_string(),
            editor_token: String::new(),
            search_debounce: Duration::from_millis(500),
            upload_linger: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(60),
        };
        ApiClient::new(&config, Arc::new(MemoryCredentialStore::new())).unwrap()
    }

    #[test]
    fn download_url_variants() {
        let client = client();
        assert_eq!(
            client.download_url(42, false),
            "http://localhost:8000/api/files/download/42"
        );
        assert_eq!(
            client.download_url(42, true),
            "http://localhost:8000/api/files/download/42?preview=true"
        );
    }

    #[tokio::test]
    async fn login_rejects_empty_credentials_client_side() {
        let client = client();
        let err = client.login("", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        let err = client.login("alice", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_rejects_empty_filename() {
        let client = client();
        let err = client
            .upload_file(
                Namespace::Public,
                &RemotePath::root(),
                "",
                vec![1, 2, 3],
                Arc::new(|_| {}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
