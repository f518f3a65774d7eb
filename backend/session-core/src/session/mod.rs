//! In-memory session state and the actions built on it.
//!
//! # Architecture
//!
//! [`SessionState`] is the single owner of tokens and the cached user. It is
//! created once at startup, shared as `Arc<SessionState>` with the
//! [`ApiClient`](crate::api_client::ApiClient) and the
//! [`Router`](crate::router::Router), and reset with
//! [`SessionState::clear_session`].
//!
//! [`SessionStore`] is the action facade views call into (login, logout,
//! profile updates, ...).
//!
//! # Locking
//!
//! Session data sits behind a `std::sync::RwLock` that is never held across
//! an `.await`. Setting or clearing tokens happens under one write lock, so a
//! reader sees either the old session or the new one, never half of each.
//! Refreshes are serialized by a separate async gate (see
//! [`SessionState::refresh_access_token`]). A refresh only commits its
//! result if the session still holds the refresh token it sent, so a logout
//! or login that lands while the call is in flight wins.

pub mod notifier;
pub mod outcome;
pub mod store;

pub use notifier::{LogNotifier, Notifier};
pub use outcome::{ActionResult, FailureKind};
pub use store::SessionStore;

use crate::auth_api::AuthApiClient;
use crate::storage::TokenStorage;
use crate::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

use common::RedactedToken;
use models::{TokenPair, User};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info, warn};
use serde_json::{Map, Value};
use tokio::sync::Mutex as AsyncMutex;

/// Snapshot of the session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: Option<RedactedToken>,
    pub refresh_token: Option<RedactedToken>,
    pub current_user: Option<User>,
    pub is_loading: bool,
}

impl Session {
    /// Authenticated means "holds an access token"; the user may not be fetched yet.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Result of a refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new access token was fetched and stored.
    Refreshed,
    /// Another caller refreshed while this one waited; the current token is new.
    Coalesced,
    /// Nothing to refresh with. No network call was made.
    NoRefreshToken,
    /// The server rejected the refresh token or the call failed. The session was cleared.
    Failed,
    /// The session was cleared or replaced while the call was in flight. Its
    /// result was discarded and the newer session left untouched.
    Superseded,
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed | RefreshOutcome::Coalesced)
    }
}

pub struct SessionState {
    session: RwLock<Session>,
    storage: Arc<dyn TokenStorage>,
    auth_api: AuthApiClient,
    refresh_gate: AsyncMutex<()>,
    /// Actions currently holding a [`LoadingGuard`].
    in_flight: AtomicUsize,
}

impl SessionState {
    /// Create the session, hydrated from whatever tokens `storage` holds.
    ///
    /// Storage read failures are logged and treated as "no session".
    pub fn new(storage: Arc<dyn TokenStorage>, auth_api: AuthApiClient) -> Self {
        let access_token = load_token(storage.as_ref(), ACCESS_TOKEN_KEY);
        let refresh_token = load_token(storage.as_ref(), REFRESH_TOKEN_KEY);

        if access_token.is_some() {
            info!("Restored persisted session");
        } else {
            debug!("No persisted access token, starting signed out");
        }

        Self {
            session: RwLock::new(Session {
                access_token,
                refresh_token,
                current_user: None,
                is_loading: false,
            }),
            storage,
            auth_api,
            refresh_gate: AsyncMutex::new(()),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn auth_api(&self) -> &AuthApiClient {
        &self.auth_api
    }

    pub fn snapshot(&self) -> Session {
        let mut session = self.read().clone();
        session.is_loading = self.is_loading();
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// True while at least one action is running.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn access_token(&self) -> Option<RedactedToken> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<RedactedToken> {
        self.read().refresh_token.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().current_user.clone()
    }

    /// Store both tokens in memory and in durable storage.
    pub fn set_tokens(&self, tokens: &TokenPair) {
        let mut session = self.write();
        session.access_token = Some(RedactedToken::new(tokens.access.as_str()));
        session.refresh_token = Some(RedactedToken::new(tokens.refresh.as_str()));
        self.persist(ACCESS_TOKEN_KEY, Some(&tokens.access));
        self.persist(REFRESH_TOKEN_KEY, Some(&tokens.refresh));
    }

    /// Drop both tokens, in memory and in storage. The cached user stays.
    pub fn clear_tokens(&self) {
        let mut session = self.write();
        session.access_token = None;
        session.refresh_token = None;
        self.persist(ACCESS_TOKEN_KEY, None);
        self.persist(REFRESH_TOKEN_KEY, None);
    }

    /// Drop tokens and the cached user without any network call.
    pub fn clear_session(&self) {
        let mut session = self.write();
        self.clear_locked(&mut session);
    }

    fn clear_locked(&self, session: &mut Session) {
        session.access_token = None;
        session.refresh_token = None;
        session.current_user = None;
        self.persist(ACCESS_TOKEN_KEY, None);
        self.persist(REFRESH_TOKEN_KEY, None);
        debug!("Session cleared");
    }

    pub(crate) fn set_user(&self, user: Option<User>) {
        self.write().current_user = user;
    }

    /// Apply `update` to the cached user, if there is one.
    pub(crate) fn update_user<F: FnOnce(&mut User)>(&self, update: F) {
        if let Some(user) = self.write().current_user.as_mut() {
            update(user);
        }
    }

    /// Shallow-merge a profile response into the cached user.
    ///
    /// Without a cached user the patch is adopted as the user if it is a
    /// complete record, and ignored otherwise.
    pub(crate) fn merge_user(&self, patch: &Map<String, Value>) {
        let mut session = self.write();

        if let Some(user) = session.current_user.as_mut() {
            if let Err(e) = user.merge(patch) {
                warn!("Profile response could not be merged into cached user: {e}");
            }
            return;
        }

        match serde_json::from_value::<User>(Value::Object(patch.clone())) {
            Ok(user) => session.current_user = Some(user),
            Err(_) => debug!("No cached user to merge profile response into"),
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// - No refresh token: returns [`RefreshOutcome::NoRefreshToken`] without a network call.
    /// - Success: the new access token replaces the old one; the refresh token is reused.
    /// - Any failure: the whole session is cleared.
    /// - The session changed during the call (logout, login, clear): the
    ///   result is dropped and [`RefreshOutcome::Superseded`] returned.
    ///
    /// Refreshes are serialized: a second caller waits for the first to finish.
    pub async fn refresh_access_token(&self) -> RefreshOutcome {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    /// Refresh on behalf of a request that got a 401 while sending `stale`.
    ///
    /// If another request already refreshed while this one waited at the
    /// gate, the current token differs from `stale` and no second refresh
    /// call is made.
    pub(crate) async fn refresh_after_unauthorized(
        &self,
        stale: Option<&RedactedToken>,
    ) -> RefreshOutcome {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.access_token() {
            if stale != Some(&current) {
                debug!("Access token was refreshed by a concurrent request");
                return RefreshOutcome::Coalesced;
            }
        }

        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.refresh_token() else {
            debug!("No refresh token held, cannot refresh");
            return RefreshOutcome::NoRefreshToken;
        };

        let result = self.auth_api.refresh(&refresh_token).await;

        let mut session = self.write();
        if session.refresh_token.as_ref() != Some(&refresh_token) {
            info!("Session changed while refreshing, discarding refresh result");
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                session.access_token = Some(RedactedToken::new(response.access.as_str()));
                self.persist(ACCESS_TOKEN_KEY, Some(&response.access));
                info!("Access token refreshed");
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                warn!(
                    "Token refresh failed ({}), clearing session: {}",
                    e.error_category(),
                    e
                );
                self.clear_locked(&mut session);
                RefreshOutcome::Failed
            }
        }
    }

    fn persist(&self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(value) => self.storage.set(key, value),
            None => self.storage.remove(key),
        };

        if let Err(e) = result {
            warn!("Failed to persist {key}: {e}");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_token(storage: &dyn TokenStorage, key: &str) -> Option<RedactedToken> {
    match storage.get(key) {
        Ok(Some(value)) if !value.is_empty() => Some(RedactedToken::new(value)),
        Ok(_) => None,
        Err(e) => {
            warn!("Failed to read {key} from token storage: {e}");
            None
        }
    }
}

/// Counts one running action for its lifetime. `is_loading` stays raised
/// until every guard is dropped, whether by return or by cancellation.
pub(crate) struct LoadingGuard<'a> {
    state: &'a SessionState,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn raise(state: &'a SessionState) -> Self {
        state.in_flight.fetch_add(1, Ordering::SeqCst);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Clears the session when dropped, whatever path the owner exits through.
pub(crate) struct ClearOnDrop<'a> {
    state: &'a SessionState,
}

impl<'a> ClearOnDrop<'a> {
    pub(crate) fn new(state: &'a SessionState) -> Self {
        Self { state }
    }
}

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.state.clear_session();
    }
}
