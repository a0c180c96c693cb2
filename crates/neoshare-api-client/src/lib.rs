//! HTTP client for the NeoShare API.
//!
//! Provides a minimal adapter with bearer-token auth read from the
//! persisted credential store, generic request helpers, and domain
//! methods for every endpoint the client uses. On any 401 response the
//! adapter clears the persisted token and returns `ClientError::Auth`;
//! redirect/logout UX is the caller's responsibility. No retries.

pub mod api;
pub mod credentials;
mod progress;
pub mod traits;

use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;

use neoshare_core::{ClientConfig, ClientError, ClientResult};

pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, StoredCredentials,
};
pub use progress::ProgressFn;
pub use traits::FileApi;

/// HTTP client for the NeoShare API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialStore>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(ApiClient {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Create a client from environment configuration with a file-backed
    /// credential store.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ClientConfig::from_env()?;
        let store = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
        Ok(Self::new(&config, store)?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    fn token(&self) -> Option<String> {
        match self.credentials.load() {
            Ok(stored) => stored.map(|c| c.token),
            Err(e) => {
                tracing::warn!("Failed to read persisted credentials: {e}");
                None
            }
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Check a response status. On 401 the persisted token is cleared
    /// before the error propagates.
    async fn check(&self, response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status.as_u16() == 401 {
            tracing::debug!("Received 401, clearing persisted token");
            if let Err(e) = self.credentials.clear() {
                tracing::warn!("Failed to clear persisted credentials: {e}");
            }
        }

        Err(ClientError::from_status(status.as_u16(), message))
    }

    async fn read_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> ClientResult<T> {
        response
            .json()
            .await
            .map_err(|e| ClientError::Network(format!("Failed to parse response as JSON: {e}")))
    }

    /// GET request with optional query parameters. Deserializes JSON.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let mut request = self.apply_auth(self.client.get(self.build_url(path)));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await.map_err(transport_error)?;
        let response = self.check(response).await?;
        self.read_json(response).await
    }

    /// GET request returning the raw body bytes (downloads).
    pub async fn get_bytes(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<bytes::Bytes> {
        let mut request = self.apply_auth(self.client.get(self.build_url(path)));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await.map_err(transport_error)?;
        let response = self.check(response).await?;
        response.bytes().await.map_err(transport_error)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).json(body));
        let response = request.send().await.map_err(transport_error)?;
        let response = self.check(response).await?;
        self.read_json(response).await
    }

    /// POST a form-encoded body (the login endpoint) and deserialize.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> ClientResult<T> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).form(form));
        let response = request.send().await.map_err(transport_error)?;
        let response = self.check(response).await?;
        self.read_json(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ClientResult<T> {
        let request = self.apply_auth(self.client.post(self.build_url(path)).multipart(form));
        let response = request.send().await.map_err(transport_error)?;
        let response = self.check(response).await?;
        self.read_json(response).await
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.apply_auth(self.client.put(self.build_url(path)).json(body));
        let response = request.send().await.map_err(transport_error)?;
        let response = self.check(response).await?;
        self.read_json(response).await
    }

    /// DELETE request. The response body, if any, is discarded.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        let request = self.apply_auth(self.client.delete(self.build_url(path)));
        let response = request.send().await.map_err(transport_error)?;
        self.check(response).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    ClientError::Network(err.to_string())
}
