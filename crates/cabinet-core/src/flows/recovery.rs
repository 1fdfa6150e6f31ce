//! Password recovery wizard: request a code, then reset with it.

use anyhow::Result;

use crate::api::AuthService;
use crate::api::auth::ensure_passwords_match;
use crate::api::error::{display_message, require};
use crate::api::types::MessageResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryStep {
    #[default]
    Email,
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryState {
    pub step: RecoveryStep,
    pub email: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct PasswordRecovery<'a> {
    api: &'a AuthService,
    state: RecoveryState,
}

impl<'a> PasswordRecovery<'a> {
    pub fn new(api: &'a AuthService) -> Self {
        Self {
            api,
            state: RecoveryState::default(),
        }
    }

    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    pub fn step(&self) -> RecoveryStep {
        self.state.step
    }

    /// Requests a recovery code and moves to the reset step.
    ///
    /// # Errors
    /// Returns the underlying error after recording its display message.
    pub async fn forgot_password(&mut self, email: &str) -> Result<MessageResponse> {
        self.begin();
        let result = match require(Some(email), "email") {
            Ok(()) => self.api.forgot_password(email).await,
            Err(e) => Err(e.into()),
        };
        let response = self.finish(result)?;
        self.state.email = email.to_string();
        self.state.step = RecoveryStep::Reset;
        Ok(response)
    }

    /// Sets a new password using the emailed code.
    ///
    /// # Errors
    /// Returns a validation error without a request when a field is empty or
    /// the confirmation differs, otherwise the underlying API error.
    pub async fn reset_password(
        &mut self,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<MessageResponse> {
        self.begin();
        let result = self.submit_reset(code, new_password, confirm_password).await;
        self.finish(result)
    }

    async fn submit_reset(
        &self,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<MessageResponse> {
        require(Some(code), "code")?;
        require(Some(new_password), "new_password")?;
        ensure_passwords_match(new_password, confirm_password)?;
        self.api.reset_password(code, new_password).await
    }

    /// Back to a fresh email step.
    pub fn reset_state(&mut self) {
        self.state = RecoveryState::default();
    }

    fn begin(&mut self) {
        self.state.is_loading = true;
        self.state.error = None;
    }

    fn finish<T>(&mut self, result: Result<T>) -> Result<T> {
        self.state.is_loading = false;
        if let Err(e) = &result {
            self.state.error = Some(display_message(e));
        }
        result
    }
}
