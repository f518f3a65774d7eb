use super::{ActionResult, ClearOnDrop, FailureKind, LoadingGuard, Notifier, SessionState};
use super::{RefreshOutcome, Session};
use crate::api_client::{ApiClient, ApiRequest, UploadFile};
use crate::error::ApiError;
use crate::{AVATAR_ENDPOINT, CHANGE_PASSWORD_ENDPOINT, ME_ENDPOINT, PROFILE_ENDPOINT};

use models::{AvatarResponse, Credentials, NewUser, PasswordChange, User};

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Map, Value};

const LOGIN_SUCCEEDED: &str = "Signed in successfully";
const LOGIN_FAILED: &str = "Could not sign in";
const REGISTER_PENDING: &str = "Registration successful. Your account is pending verification.";
const REGISTER_FAILED: &str = "Could not register user";
const LOGGED_OUT: &str = "Signed out";
const PROFILE_UPDATED: &str = "Profile updated successfully";
const PROFILE_FAILED: &str = "Could not update profile";
const PASSWORD_CHANGED: &str = "Password changed successfully";
const PASSWORD_FAILED: &str = "Could not change password";
const AVATAR_UPDATED: &str = "Avatar updated successfully";
const AVATAR_FAILED: &str = "Could not upload avatar";

/// Multipart field the avatar endpoint reads the image from.
const AVATAR_FIELD: &str = "avatar";

/// The session actions views call into.
///
/// Every action is total: errors are turned into [`ActionResult::Failure`]
/// (and an error notification) instead of being returned.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<SessionState>,
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl SessionStore {
    pub fn new(state: Arc<SessionState>, api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state,
            api,
            notifier,
        }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.current_user()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn snapshot(&self) -> Session {
        self.state.snapshot()
    }

    pub async fn login(&self, credentials: &Credentials) -> ActionResult {
        let _loading = LoadingGuard::raise(&self.state);

        match self.state.auth_api().login(credentials).await {
            Ok(response) => {
                self.state.set_tokens(&response.tokens);
                info!("Signed in as user {}", response.user.id);
                self.state.set_user(Some(response.user));
                self.notifier.success(LOGIN_SUCCEEDED);
                ActionResult::success_with(LOGIN_SUCCEEDED)
            }
            Err(e) => {
                let kind = if e.is_forbidden() {
                    FailureKind::Unverified
                } else if e.is_network() {
                    FailureKind::Network
                } else {
                    FailureKind::Rejected
                };
                self.reject("login", &e, LOGIN_FAILED, kind)
            }
        }
    }

    /// Create an account. The account must be verified before it can sign
    /// in, so no tokens are stored and the session stays as it was.
    pub async fn register(&self, new_user: &NewUser) -> ActionResult {
        let _loading = LoadingGuard::raise(&self.state);

        match self.state.auth_api().register(new_user).await {
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| String::from(REGISTER_PENDING));
                self.notifier.success(&message);
                ActionResult::success_with(message)
            }
            Err(e) => {
                let kind = if e.is_network() {
                    FailureKind::Network
                } else {
                    FailureKind::Rejected
                };
                self.reject("register", &e, REGISTER_FAILED, kind)
            }
        }
    }

    /// Tell the server to blacklist the refresh token, then drop the local
    /// session. Server errors are logged and ignored; the local session is
    /// cleared no matter how this future ends.
    pub async fn logout(&self) -> ActionResult {
        {
            let _clear = ClearOnDrop::new(&self.state);

            if let Some(refresh_token) = self.state.refresh_token() {
                let access_token = self.state.access_token();
                if let Err(e) = self
                    .state
                    .auth_api()
                    .logout(access_token.as_ref(), &refresh_token)
                    .await
                {
                    warn!("Server logout failed ({}): {}", e.error_category(), e);
                }
            }
        }

        self.notifier.info(LOGGED_OUT);
        ActionResult::success_with(LOGGED_OUT)
    }

    /// Load the signed-in user. Does nothing without an access token.
    ///
    /// A 401 that survives the refresh attempt drops the tokens silently.
    pub async fn fetch_user(&self) {
        if !self.state.is_authenticated() {
            return;
        }

        match self.api.get(ME_ENDPOINT).await.and_then(|r| r.json::<User>()) {
            Ok(user) => {
                debug!("Fetched user {}", user.id);
                self.state.set_user(Some(user));
            }
            Err(e) if e.is_unauthorized() => {
                debug!("User fetch unauthorized, clearing tokens");
                self.state.clear_tokens();
            }
            Err(e) => warn!("Failed to fetch user ({}): {}", e.error_category(), e),
        }
    }

    /// Send a partial profile and merge the server's answer into the cached user.
    pub async fn update_profile(&self, changes: &Map<String, Value>) -> ActionResult {
        let _loading = LoadingGuard::raise(&self.state);

        let response = self.api.patch(PROFILE_ENDPOINT, changes).await;

        match response.and_then(|r| r.json_or_default::<Map<String, Value>>()) {
            Ok(patch) => {
                self.state.merge_user(&patch);
                self.notifier.success(PROFILE_UPDATED);
                ActionResult::success_with(PROFILE_UPDATED)
            }
            Err(e) => self.reject("profile update", &e, PROFILE_FAILED, failure_kind(&e)),
        }
    }

    pub async fn change_password(&self, change: &PasswordChange) -> ActionResult {
        let _loading = LoadingGuard::raise(&self.state);

        match self.api.put(CHANGE_PASSWORD_ENDPOINT, change).await {
            Ok(_) => {
                self.notifier.success(PASSWORD_CHANGED);
                ActionResult::success_with(PASSWORD_CHANGED)
            }
            Err(e) => self.reject("password change", &e, PASSWORD_FAILED, failure_kind(&e)),
        }
    }

    pub async fn upload_avatar(&self, file: UploadFile) -> ActionResult {
        let _loading = LoadingGuard::raise(&self.state);

        let request = ApiRequest::patch(AVATAR_ENDPOINT).with_file(AVATAR_FIELD, file);
        let response = self.api.execute(request).await;

        match response.and_then(|r| r.json_or_default::<AvatarResponse>()) {
            Ok(response) => {
                if let Some(avatar) = response.avatar {
                    self.state.update_user(|user| user.avatar = Some(avatar));
                }
                self.notifier.success(AVATAR_UPDATED);
                ActionResult::success_with(AVATAR_UPDATED)
            }
            Err(e) => self.reject("avatar upload", &e, AVATAR_FAILED, failure_kind(&e)),
        }
    }

    /// Returns `true` when a new access token is now held.
    pub async fn refresh_access_token(&self) -> bool {
        self.state.refresh_access_token().await == RefreshOutcome::Refreshed
    }

    /// Fetch the user if a token is held but no user is cached. Safe to call
    /// before every navigation.
    pub async fn check_auth(&self) {
        if self.state.is_authenticated() && self.state.current_user().is_none() {
            self.fetch_user().await;
        }
    }

    pub fn clear_session(&self) {
        self.state.clear_session();
    }

    fn reject(
        &self,
        action: &str,
        error: &ApiError,
        fallback: &str,
        kind: FailureKind,
    ) -> ActionResult {
        warn!("{action} failed ({}): {}", error.error_category(), error);

        let message = match kind {
            FailureKind::Network => fallback,
            _ => error.detail().unwrap_or(fallback),
        };

        self.notifier.error(message);
        ActionResult::failure(message, kind)
    }
}

/// Classify a failure of a call made through the intercepted client, where a
/// 401 means the refresh attempt already failed.
fn failure_kind(error: &ApiError) -> FailureKind {
    if error.is_network() {
        FailureKind::Network
    } else if error.is_unauthorized() {
        FailureKind::NoSession
    } else {
        FailureKind::Rejected
    }
}
