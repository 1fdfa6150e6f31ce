//! Registration wizard: email, then code verification, then done.

use anyhow::Result;

use crate::api::{AuthService, ValidationError};
use crate::api::error::{display_message, require};
use crate::api::types::{MessageResponse, RegisterForm, RegisterResponse, SendCodeResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationStep {
    #[default]
    Email,
    CodeVerification,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationState {
    pub step: RegistrationStep,
    /// Captured once a code has been sent.
    pub email: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Steps only move forward on success; [`RegistrationFlow::reset`] is the
/// only way back to [`RegistrationStep::Email`].
#[derive(Debug)]
pub struct RegistrationFlow<'a> {
    api: &'a AuthService,
    state: RegistrationState,
}

impl<'a> RegistrationFlow<'a> {
    pub fn new(api: &'a AuthService) -> Self {
        Self {
            api,
            state: RegistrationState::default(),
        }
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn step(&self) -> RegistrationStep {
        self.state.step
    }

    /// Sends a code and moves to the verification step.
    ///
    /// # Errors
    /// Returns [`ValidationError::OutOfOrder`] (no request made) outside the
    /// email step, otherwise the underlying error after recording its display
    /// message.
    pub async fn send_verification_code(&mut self, email: &str) -> Result<SendCodeResponse> {
        self.begin();
        let result = match self.expect_step(RegistrationStep::Email) {
            Ok(()) => self.api.send_verification_code(email).await,
            Err(e) => Err(e.into()),
        };
        let response = self.finish(result)?;
        self.state.email = if response.email.is_empty() {
            email.to_string()
        } else {
            response.email.clone()
        };
        self.state.step = RegistrationStep::CodeVerification;
        Ok(response)
    }

    /// Verifies the code and creates the account.
    ///
    /// The form's email is filled from the captured one when left empty.
    ///
    /// # Errors
    /// Returns a validation error (no request made) outside the verification
    /// step or when `code`, `name` or `second_name` is missing, otherwise the
    /// underlying API error.
    pub async fn verify_code_and_register(
        &mut self,
        form: &RegisterForm,
    ) -> Result<RegisterResponse> {
        self.begin();
        let result = self.submit_registration(form).await;
        let response = self.finish(result)?;
        self.state.step = RegistrationStep::Completed;
        Ok(response)
    }

    async fn submit_registration(&self, form: &RegisterForm) -> Result<RegisterResponse> {
        self.expect_step(RegistrationStep::CodeVerification)?;
        require(form.code.as_deref(), "code")?;
        require(form.name.as_deref(), "name")?;
        require(form.second_name.as_deref(), "second_name")?;

        let mut form = form.clone();
        if form.email.is_empty() {
            form.email.clone_from(&self.state.email);
        }
        self.api.verify_code_and_register(&form).await
    }

    /// Re-issues a code to the captured email. The step does not change.
    ///
    /// # Errors
    /// Returns a validation error outside the verification step, otherwise the
    /// underlying error after recording its display message.
    pub async fn resend_verification_code(&mut self) -> Result<MessageResponse> {
        self.begin();
        let result = self.submit_resend().await;
        self.finish(result)
    }

    async fn submit_resend(&self) -> Result<MessageResponse> {
        self.expect_step(RegistrationStep::CodeVerification)?;
        require(Some(self.state.email.as_str()), "email")?;
        self.api.resend_verification_code(&self.state.email).await
    }

    /// Back to a fresh email step.
    pub fn reset(&mut self) {
        self.state = RegistrationState::default();
    }

    fn expect_step(&self, step: RegistrationStep) -> Result<(), ValidationError> {
        if self.state.step == step {
            Ok(())
        } else {
            Err(ValidationError::OutOfOrder)
        }
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
