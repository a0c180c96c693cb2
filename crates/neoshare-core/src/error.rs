//! Error types module
//!
//! All client-side failures are unified under the `ClientError` enum:
//! authentication failures, transport failures, client-side validation,
//! render-boundary failures, and non-401 server rejections.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid credentials or an expired/invalid token. The HTTP adapter
    /// has already cleared the persisted token when this is returned for
    /// a 401 response.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure (connect, timeout, body read). Never
    /// retried automatically.
    #[error("Network error: {0}")]
    Network(String),

    /// Rejected client-side before any request was dispatched.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Malformed preview payload (e.g. invalid notebook structure).
    /// Caught at the render boundary, never fatal.
    #[error("Render error: {0}")]
    Render(String),

    /// Non-401 server rejection, surfaced to the call site for
    /// user-facing messaging.
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Map an unsuccessful HTTP status to the error taxonomy.
    /// 401 is an auth failure; everything else is a plain API rejection.
    pub fn from_status(status: u16, message: String) -> Self {
        if status == 401 {
            ClientError::Auth(message)
        } else {
            ClientError::Api { status, message }
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_maps_401_to_auth() {
        let err = ClientError::from_status(401, "token expired".to_string());
        assert!(err.is_auth());
    }

    #[test]
    fn from_status_maps_other_to_api() {
        let err = ClientError::from_status(403, "not authorized".to_string());
        assert!(!err.is_auth());
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "not authorized");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
