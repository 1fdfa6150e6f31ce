//! User-resource endpoints client.

use anyhow::Result;

use super::Transport;
use super::types::{ProfilePatch, User};
use crate::config::Config;
use crate::store::TokenStore;

/// Profile reads and updates for the signed-in user.
#[derive(Debug, Clone)]
pub struct UserService {
    transport: Transport,
}

impl UserService {
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
        Ok(Self::new(&config.user_base_url()?, store))
    }

    /// Fetches the current user's profile.
    ///
    /// # Errors
    /// Returns an [`super::ApiError`] (401 without a valid token).
    pub async fn get_profile(&self) -> Result<User> {
        self.transport.get("/profile").await
    }

    /// Applies a partial update and refreshes the stored user record.
    ///
    /// # Errors
    /// Returns an [`super::ApiError`] if the backend rejects the update.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<User> {
        let user: User = self.transport.patch("/profile", patch).await?;
        if self.transport.store().token().is_some() {
            self.transport.store().save_user(&user)?;
        }
        Ok(user)
    }
}
