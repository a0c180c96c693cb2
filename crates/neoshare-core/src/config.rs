//! Configuration module
//!
//! Environment-driven configuration for the client: API base URL,
//! credential persistence location, external editor deep-link settings,
//! and timing knobs for search debouncing and the upload progress linger.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Defaults
const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_EDITOR_PORT: u16 = 8888;
const SEARCH_DEBOUNCE_MS: u64 = 500;
const UPLOAD_LINGER_MS: u64 = 1000;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// REST API base URL, no trailing slash.
    pub api_url: String,
    /// Where the token and identity are persisted between runs.
    pub credentials_path: PathBuf,
    /// Base URL of the external editor service.
    pub editor_url: String,
    /// Access token appended to constructed external-editor links.
    pub editor_token: String,
    /// Quiet period before a search query is dispatched.
    pub search_debounce: Duration,
    /// Trailing delay before the uploading flag clears, so a finished
    /// 100% state can be rendered.
    pub upload_linger: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let api_url = env::var("NEOSHARE_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let credentials_path = env::var("NEOSHARE_CREDENTIALS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_credentials_path());

        let editor_url = env::var("NEOSHARE_EDITOR_URL")
            .unwrap_or_else(|_| format!("http://localhost:{DEFAULT_EDITOR_PORT}"))
            .trim_end_matches('/')
            .to_string();

        let editor_token = env::var("NEOSHARE_EDITOR_TOKEN").unwrap_or_default();

        let search_debounce_ms = env::var("NEOSHARE_SEARCH_DEBOUNCE_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(SEARCH_DEBOUNCE_MS);

        let upload_linger_ms = env::var("NEOSHARE_UPLOAD_LINGER_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(UPLOAD_LINGER_MS);

        let request_timeout_secs = env::var("NEOSHARE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(REQUEST_TIMEOUT_SECS);

        let config = ClientConfig {
            api_url,
            credentials_path,
            editor_url,
            editor_token,
            search_debounce: Duration::from_millis(search_debounce_ms),
            upload_linger: Duration::from_millis(upload_linger_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "NEOSHARE_API_URL must be an http(s) URL, got {}",
                self.api_url
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(anyhow::anyhow!(
                "NEOSHARE_REQUEST_TIMEOUT_SECS must be greater than zero"
            ));
        }
        Ok(())
    }
}

fn default_credentials_path() -> PathBuf {
    let base = env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".neoshare").join("credentials.json")
}
