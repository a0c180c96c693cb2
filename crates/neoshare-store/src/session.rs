//! Auth session store
//!
//! Tab-lifetime cached identity and token, backed by the durable
//! credential store. The invariant `authenticated == token.is_some()`
//! holds after every operation; `revalidate` is the only path that talks
//! to the server and any failure there leaves a fully logged-out state.

use std::sync::{Arc, Mutex, MutexGuard};

use neoshare_api_client::{CredentialStore, FileApi, StoredCredentials};
use neoshare_core::models::UserIdentity;
use neoshare_core::ClientResult;

/// Read-only view of the session state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<UserIdentity>,
    pub authenticated: bool,
}

struct SessionState {
    token: Option<String>,
    user: Option<UserIdentity>,
}

pub struct SessionStore {
    api: Arc<dyn FileApi>,
    credentials: Arc<dyn CredentialStore>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Create the store, seeding state from persisted credentials.
    pub fn new(api: Arc<dyn FileApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        let persisted = match credentials.load() {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("Failed to read persisted credentials: {e}");
                None
            }
        };
        let state = match persisted {
            Some(stored) => SessionState {
                token: Some(stored.token),
                user: stored.user,
            },
            None => SessionState {
                token: None,
                user: None,
            },
        };
        SessionStore {
            api,
            credentials,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            token: state.token.clone(),
            user: state.user.clone(),
            authenticated: state.token.is_some(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().token.is_some()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.lock().user.clone()
    }

    /// Cache and persist an already-issued token plus identity. No
    /// server round-trip.
    pub fn login(&self, token: String, user: UserIdentity) -> ClientResult<()> {
        self.credentials.store(&StoredCredentials {
            token: token.clone(),
            user: Some(user.clone()),
        })?;
        let mut state = self.lock();
        state.token = Some(token);
        state.user = Some(user);
        Ok(())
    }

    /// Clear the persisted token and identity.
    pub fn logout(&self) {
        if let Err(e) = self.credentials.clear() {
            tracing::warn!("Failed to clear persisted credentials: {e}");
        }
        let mut state = self.lock();
        state.token = None;
        state.user = None;
    }

    /// Validate the persisted token against the identity endpoint.
    ///
    /// No-op without a token. On success the cached identity is
    /// refreshed and re-persisted. On any failure (network, 401,
    /// malformed response) the session is treated as invalid and cleared
    /// exactly as `logout` would; the error never surfaces to the
    /// caller. Expected to run once at process start.
    pub async fn revalidate(&self) {
        let token = match self.lock().token.clone() {
            Some(token) => token,
            None => return,
        };

        match self.api.fetch_me().await {
            Ok(user) => {
                if let Err(e) = self.credentials.store(&StoredCredentials {
                    token: token.clone(),
                    user: Some(user.clone()),
                }) {
                    tracing::warn!("Failed to persist refreshed identity: {e}");
                }
                let mut state = self.lock();
                state.token = Some(token);
                state.user = Some(user);
            }
            Err(e) => {
                tracing::warn!("Session revalidation failed, logging out: {e}");
                self.logout();
            }
        }
    }
}
