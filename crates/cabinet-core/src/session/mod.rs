//! Session management: bootstrap, login, logout and Google callback.
//!
//! [`AuthSession`] is the single owner of [`SessionState`]. Consumers hold it
//! explicitly and read state through [`AuthSession::state`].

mod state;

use anyhow::Result;

pub use self::state::{AuthAction, SessionState};
use crate::api::AuthService;
use crate::api::error::display_message;
use crate::api::types::{AuthResponse, LoginForm, User};

/// Session object shared by every consumer of auth state.
#[derive(Debug)]
pub struct AuthSession {
    api: AuthService,
    state: SessionState,
    bootstrapped: bool,
}

impl AuthSession {
    pub fn new(api: AuthService) -> Self {
        Self {
            api,
            state: SessionState::default(),
            bootstrapped: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn api(&self) -> &AuthService {
        &self.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn dispatch(&mut self, action: AuthAction) {
        self.state.apply(action);
    }

    /// Restores the session from the token store.
    ///
    /// Runs once; later calls return false and leave state alone. No request
    /// is made: the stored token is judged by its expiry claim only.
    pub fn bootstrap(&mut self) -> bool {
        if self.bootstrapped {
            return false;
        }
        self.bootstrapped = true;

        let token = self.api.stored_token();
        let user = self.api.stored_user();
        match (token, user) {
            (Some(token), Some(user)) if self.api.is_token_valid() => {
                tracing::debug!("session restored from storage");
                self.dispatch(AuthAction::Success { user, token });
            }
            (token, _) => {
                if token.is_some() {
                    tracing::info!("stored session is expired or incomplete");
                }
                self.dispatch(AuthAction::Failure {
                    message: String::new(),
                });
            }
        }
        true
    }

    /// Signs in with credentials.
    ///
    /// On failure the display message lands in `state().error` and the
    /// underlying error is returned so the caller can react as well.
    ///
    /// # Errors
    /// Returns whatever [`AuthService::login`] returned.
    pub async fn login(&mut self, form: &LoginForm) -> Result<AuthResponse> {
        self.dispatch(AuthAction::Start);
        match self.api.login(form).await {
            Ok(response) => {
                self.dispatch(AuthAction::Success {
                    user: response.user.clone(),
                    token: response.access_token.clone(),
                });
                Ok(response)
            }
            Err(e) => {
                self.dispatch(AuthAction::Failure {
                    message: display_message(&e),
                });
                Err(e)
            }
        }
    }

    /// Signs out. Always succeeds from the caller's point of view.
    pub async fn logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %format!("{e:#}"), "server-side logout failed");
        }
        self.dispatch(AuthAction::Logout);
    }

    /// Completes the Google redirect flow from callback query parameters.
    ///
    /// Returns true when a session was established. Never fails: parse or
    /// storage problems become an [`AuthAction::Failure`].
    pub fn handle_google_callback(&mut self, params: &str) -> bool {
        match self.api.handle_google_callback(params) {
            Ok(Some(callback)) => {
                self.dispatch(AuthAction::Success {
                    user: callback.user,
                    token: callback.token,
                });
                true
            }
            Ok(None) => {
                self.dispatch(AuthAction::Failure {
                    message: "Google sign-in failed: missing token or user".to_string(),
                });
                false
            }
            Err(e) => {
                self.dispatch(AuthAction::Failure {
                    message: display_message(&e),
                });
                false
            }
        }
    }

    /// Replaces the in-memory user after a profile update succeeded elsewhere.
    pub fn update_user(&mut self, user: User) {
        self.dispatch(AuthAction::SetUser(user));
    }

    pub fn clear_error(&mut self) {
        self.dispatch(AuthAction::ClearError);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::UserId;
    use crate::jwt::testing::token_expiring_at;
    use crate::store::TokenStore;

    fn session_with(store: &TokenStore) -> AuthSession {
        AuthSession::new(AuthService::new("http://127.0.0.1:9/auth", store.clone()))
    }

    #[test]
    fn test_bootstrap_restores_valid_session() {
        let store = TokenStore::in_memory();
        let token = token_expiring_at(chrono::Utc::now().timestamp() + 600);
        store
            .save(&token, &User::with_id(UserId::Number(4)))
            .unwrap();

        let mut session = session_with(&store);
        assert!(session.state().is_loading);
        assert!(session.bootstrap());

        let state = session.state();
        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(state.token(), Some(token.as_str()));
    }

    #[test]
    fn test_bootstrap_rejects_expired_token() {
        let store = TokenStore::in_memory();
        let token = token_expiring_at(chrono::Utc::now().timestamp() - 10);
        store
            .save(&token, &User::with_id(UserId::Number(4)))
            .unwrap();

        let mut session = session_with(&store);
        session.bootstrap();

        let state = session.state();
        assert!(!state.is_authenticated);
        assert!(!state.is_loading);
        assert!(state.user.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_bootstrap_runs_once() {
        let store = TokenStore::in_memory();
        let mut session = session_with(&store);
        assert!(session.bootstrap());

        let token = token_expiring_at(chrono::Utc::now().timestamp() + 600);
        store
            .save(&token, &User::with_id(UserId::Number(1)))
            .unwrap();
        assert!(!session.bootstrap());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_google_callback_success_and_failure() {
        let store = TokenStore::in_memory();
        let mut session = session_with(&store);

        assert!(session.handle_google_callback("token=abc&user=%7B%22id%22%3A1%7D"));
        assert!(session.is_authenticated());
        assert_eq!(session.state().token(), Some("abc"));

        assert!(!session.handle_google_callback("token=abc"));
        assert!(!session.is_authenticated());
        assert!(session.state().error.is_some());
        // The previously stored pair is not erased by a failed parse.
        assert_eq!(store.token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_update_user_keeps_token() {
        let store = TokenStore::in_memory();
        let mut session = session_with(&store);
        session.handle_google_callback("token=abc&user=%7B%22id%22%3A1%7D");

        let mut renamed = User::with_id(UserId::Number(1));
        renamed.name = Some("Anna".to_string());
        session.update_user(renamed);

        assert_eq!(session.state().user().unwrap().name.as_deref(), Some("Anna"));
        assert_eq!(session.state().token(), Some("abc"));
    }

    #[tokio::test]
    async fn test_clear_error_after_failed_login() {
        let store = TokenStore::in_memory();
        let mut session = session_with(&store);
        session.bootstrap();

        let form = LoginForm {
            login: "x".to_string(),
            password: "y".to_string(),
        };
        assert!(session.login(&form).await.is_err());
        assert!(session.state().error.is_some());
        assert!(!session.state().is_loading);

        session.clear_error();
        assert!(session.state().error.is_none());
        assert!(!session.is_authenticated());
    }
}
