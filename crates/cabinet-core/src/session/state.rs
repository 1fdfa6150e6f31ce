//! Session state and its reducer.
//!
//! All mutations go through [`SessionState::apply`]. `user` and `token` are
//! set together and cleared together; `is_authenticated` is true exactly when
//! both are present.

use crate::api::types::User;

/// Actions the session reducer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    /// An auth operation started.
    Start,
    /// An auth operation produced a session.
    Success { user: User, token: String },
    /// An auth operation failed, or no session could be restored.
    ///
    /// An empty message means "not signed in" rather than "attempt failed"
    /// and leaves `error` unset.
    Failure { message: String },
    Logout,
    ClearError,
    /// Local profile patch. Unlike a plain replace, it is ignored while
    /// signed out so a user never appears without a token.
    SetUser(User),
}

/// The authenticated identity held by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for SessionState {
    /// Process-start state: nothing known yet, bootstrap pending.
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            is_authenticated: false,
            is_loading: true,
            error: None,
        }
    }
}

impl SessionState {
    pub fn apply(&mut self, action: AuthAction) {
        match action {
            AuthAction::Start => {
                self.is_loading = true;
                self.error = None;
            }
            AuthAction::Success { user, token } => {
                self.user = Some(user);
                self.token = Some(token);
                self.is_authenticated = true;
                self.is_loading = false;
                self.error = None;
            }
            AuthAction::Failure { message } => {
                self.user = None;
                self.token = None;
                self.is_authenticated = false;
                self.is_loading = false;
                self.error = (!message.is_empty()).then_some(message);
            }
            AuthAction::Logout => {
                self.user = None;
                self.token = None;
                self.is_authenticated = false;
                self.error = None;
            }
            AuthAction::ClearError => self.error = None,
            AuthAction::SetUser(user) => {
                if self.is_authenticated {
                    self.user = Some(user);
                }
            }
        }
    }

    /// Returns a copy with `action` applied.
    #[must_use]
    pub fn reduce(mut self, action: AuthAction) -> Self {
        self.apply(action);
        self
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
