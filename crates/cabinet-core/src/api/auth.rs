//! Auth endpoints client.

use anyhow::Result;
use url::form_urlencoded;

use super::Transport;
use super::error::{ValidationError, require};
use super::types::{
    AuthResponse, ChangePasswordRequest, EmailRequest, GoogleLinkResponse, GoogleStatus,
    LoginForm, MessageResponse, RegisterForm, RegisterResponse, ResetPasswordRequest,
    SendCodeResponse, User,
};
use crate::config::Config;
use crate::jwt;
use crate::logging::mask_token;
use crate::store::TokenStore;

/// Token and user recovered from the Google callback query.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleCallback {
    pub token: String,
    pub user: User,
}

/// Stateless wrapper around the backend's auth endpoints.
///
/// The only persistent side effects are the token-store writes done by
/// [`AuthService::login`], [`AuthService::logout`],
/// [`AuthService::handle_google_callback`] and a registration that returns a
/// token.
#[derive(Debug, Clone)]
pub struct AuthService {
    transport: Transport,
}

impl AuthService {
    pub fn new(base_url: &str, store: TokenStore) -> Self {
        Self {
            transport: Transport::new(reqwest::Client::new(), base_url, store),
        }
    }

    /// Builds the service from resolved configuration.
    ///
    /// # Errors
    /// Returns an error if the backend origin cannot be resolved.
    pub fn from_config(config: &Config, store: TokenStore) -> Result<Self> {
        Ok(Self::new(&config.auth_base_url()?, store))
    }

    pub fn token_store(&self) -> &TokenStore {
        self.transport.store()
    }

    /// Issues a one-time code to `email`.
    ///
    /// # Errors
    /// Returns an [`super::ApiError`] if the backend rejects the request.
    pub async fn send_verification_code(&self, email: &str) -> Result<SendCodeResponse> {
        self.transport
            .post("/register/send-code", &EmailRequest { email })
            .await
    }

    /// Exchanges a code plus profile fields for a new account.
    ///
    /// `code`, `name` and `second_name` are checked locally first; a missing
    /// one fails with [`ValidationError`] without touching the network.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] or an [`super::ApiError`].
    pub async fn verify_code_and_register(&self, form: &RegisterForm) -> Result<RegisterResponse> {
        require(form.code.as_deref(), "code")?;
        require(form.name.as_deref(), "name")?;
        require(form.second_name.as_deref(), "second_name")?;

        let response: RegisterResponse = self
            .transport
            .post("/register/verify-code", form)
            .await?;

        if let Some(token) = response.access_token.as_deref() {
            self.token_store().save(token, &response.user)?;
            tracing::info!(token = %mask_token(token), "registered and signed in");
        }

        Ok(response)
    }

    /// Re-issues a code for an email already in the verification step.
    ///
    /// # Errors
    /// Returns an [`super::ApiError`] if the backend rejects the request.
    pub async fn resend_verification_code(&self, email: &str) -> Result<MessageResponse> {
        self.transport
            .post("/resend-code", &EmailRequest { email })
            .await
    }

    /// Exchanges credentials for a token and persists the pair.
    ///
    /// # Errors
    /// Returns an [`super::ApiError`] on rejected credentials, or an error if
    /// the pair cannot be persisted.
    pub async fn login(&self, form: &LoginForm) -> Result<AuthResponse> {
        let response: AuthResponse = self.transport.post("/login", form).await?;
        self.token_store()
            .save(&response.access_token, &response.user)?;
        tracing::info!(token = %mask_token(&response.access_token), "logged in");
        Ok(response)
    }

    /// Notifies the backend, then clears the token store whatever the outcome.
    ///
    /// # Errors
    /// Returns the server-side failure; the local store is cleared regardless.
    pub async fn logout(&self) -> Result<()> {
        let server = self.transport.post_discarding("/logout").await;
        if let Err(e) = self.token_store().clear() {
            tracing::warn!(error = %format!("{e:#}"), "failed to clear token store");
        }
        server
    }

    /// # Errors
    /// Returns an [`super::ApiError`] if the backend rejects the request.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<MessageResponse> {
        self.transport
            .post(
                "/change-password",
                &ChangePasswordRequest {
                    current_password,
                    new_password,
                },
            )
            .await
    }

    /// # Errors
    /// Returns an [`super::ApiError`] if the backend rejects the request.
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        self.transport
            .post("/forgot-password", &EmailRequest { email })
            .await
    }

    /// Resets the password with a recovery code.
    ///
    /// The caller is responsible for having matched the confirmation.
    ///
    /// # Errors
    /// Returns an [`super::ApiError`] if the backend rejects the request.
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<MessageResponse> {
        self.transport
            .post(
                "/reset-password",
                &ResetPasswordRequest { code, new_password },
            )
            .await
    }

    /// Backend OAuth entry point. No request is made.
    pub fn google_auth_url(&self) -> String {
        self.transport.url("/google")
    }

    /// # Errors
    /// Returns an [`super::ApiError`] (401 without a valid token).
    pub async fn google_status(&self) -> Result<GoogleStatus> {
        self.transport.get("/google/status").await
    }

    /// # Errors
    /// Returns an [`super::ApiError`] (401 without a valid token).
    pub async fn link_google_account(&self) -> Result<GoogleLinkResponse> {
        self.transport.post_empty("/google/link").await
    }

    /// # Errors
    /// Returns an [`super::ApiError`] (401 without a valid token).
    pub async fn unlink_google_account(&self) -> Result<MessageResponse> {
        self.transport.post_empty("/google/unlink").await
    }

    pub fn stored_token(&self) -> Option<String> {
        self.token_store().token()
    }

    pub fn stored_user(&self) -> Option<User> {
        self.token_store().user()
    }

    /// Checks the stored token's expiry claim locally.
    pub fn is_token_valid(&self) -> bool {
        self.stored_token()
            .is_some_and(|token| jwt::is_token_valid(&token))
    }

    /// Extracts `token` and `user` from a callback query string and persists them.
    ///
    /// Accepts a bare query (`token=..&user=..`, optionally with a leading `?`)
    /// or a full callback URL. Returns `Ok(None)` when either parameter is
    /// absent or the user is not valid JSON; the store is untouched then.
    ///
    /// # Errors
    /// Returns an error only if persisting the pair fails.
    pub fn handle_google_callback(&self, params: &str) -> Result<Option<GoogleCallback>> {
        let Some(callback) = parse_google_callback(params) else {
            return Ok(None);
        };
        self.token_store().save(&callback.token, &callback.user)?;
        tracing::info!(token = %mask_token(&callback.token), "google callback accepted");
        Ok(Some(callback))
    }
}

/// Parses callback query parameters without side effects.
pub fn parse_google_callback(params: &str) -> Option<GoogleCallback> {
    let query = callback_query(params);
    let mut token = None;
    let mut user_json = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "token" => token = Some(value.into_owned()),
            "user" => user_json = Some(value.into_owned()),
            _ => {}
        }
    }

    let token = token.filter(|t| !t.is_empty())?;
    let user_json = user_json?;
    match serde_json::from_str::<User>(&user_json) {
        Ok(user) => Some(GoogleCallback { token, user }),
        Err(e) => {
            tracing::warn!(error = %e, "google callback user is not valid JSON");
            None
        }
    }
}

fn callback_query(params: &str) -> &str {
    let trimmed = params.trim();
    match trimmed.split_once('?') {
        Some((_, query)) => query.split('#').next().unwrap_or_default(),
        None => trimmed,
    }
}

/// Convenience for views that only need the validation part.
///
/// # Errors
/// Returns [`ValidationError::PasswordMismatch`] if the two differ.
pub fn ensure_passwords_match(new_password: &str, confirm: &str) -> Result<(), ValidationError> {
    if new_password == confirm {
        Ok(())
    } else {
        Err(ValidationError::PasswordMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::UserId;

    #[test]
    fn test_parse_callback_query() {
        let cb = parse_google_callback("token=abc&user=%7B%22id%22%3A1%7D").unwrap();
        assert_eq!(cb.token, "abc");
        assert_eq!(cb.user.id, UserId::Number(1));
    }

    #[test]
    fn test_parse_callback_full_url() {
        let cb = parse_google_callback(
            "http://localhost:5173/auth/google/callback?token=t1&user=%7B%22id%22%3A%22x%22%7D#done",
        )
        .unwrap();
        assert_eq!(cb.token, "t1");
        assert_eq!(cb.user.id, UserId::Text("x".to_string()));

        assert!(parse_google_callback("?token=t&user=%7B%22id%22%3A2%7D").is_some());
    }

    #[test]
    fn test_parse_callback_missing_or_bad_params() {
        assert!(parse_google_callback("token=abc").is_none());
        assert!(parse_google_callback("user=%7B%22id%22%3A1%7D").is_none());
        assert!(parse_google_callback("token=&user=%7B%22id%22%3A1%7D").is_none());
        assert!(parse_google_callback("token=abc&user=not-json").is_none());
        assert!(parse_google_callback("").is_none());
    }

    #[test]
    fn test_handle_callback_persists_only_on_success() {
        let store = TokenStore::in_memory();
        let service = AuthService::new("http://localhost:1/auth", store.clone());

        assert!(service.handle_google_callback("token=abc").unwrap().is_none());
        assert!(store.token().is_none());

        let cb = service
            .handle_google_callback("token=abc&user=%7B%22id%22%3A1%7D")
            .unwrap()
            .unwrap();
        assert_eq!(cb.token, "abc");
        assert_eq!(store.token().as_deref(), Some("abc"));
        assert_eq!(store.user().unwrap().id, UserId::Number(1));
    }

    #[test]
    fn test_google_auth_url() {
        let service = AuthService::new("https://api.example.com/auth/", TokenStore::in_memory());
        assert_eq!(service.google_auth_url(), "https://api.example.com/auth/google");
    }

    #[test]
    fn test_is_token_valid_reads_store() {
        let store = TokenStore::in_memory();
        let service = AuthService::new("http://localhost:1/auth", store.clone());
        assert!(!service.is_token_valid());

        let future = chrono::Utc::now().timestamp() + 3600;
        let token = jwt::testing::token_expiring_at(future);
        store.save(&token, &User::with_id(UserId::Number(1))).unwrap();
        assert!(service.is_token_valid());
    }

    #[test]
    fn test_ensure_passwords_match() {
        assert!(ensure_passwords_match("a", "a").is_ok());
        assert_eq!(
            ensure_passwords_match("a", "b"),
            Err(ValidationError::PasswordMismatch)
        );
    }
}
