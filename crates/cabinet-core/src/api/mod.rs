//! REST clients for the cabinet backend.
//!
//! Both services share one request path: JSON bodies, the stored bearer token
//! when there is one, and uniform normalization of non-2xx responses into
//! [`ApiError`].

pub mod auth;
pub mod error;
pub mod types;
pub mod user;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use self::auth::AuthService;
pub use self::error::{ApiError, ValidationError, display_message};
pub use self::user::UserService;
use crate::store::TokenStore;

/// Standard User-Agent header for cabinet API requests.
pub const USER_AGENT: &str = concat!("cabinet/", env!("CARGO_PKG_VERSION"));

/// HTTP plumbing bound to one base URL.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    store: TokenStore,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, base_url: &str, store: TokenStore) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    pub(crate) fn store(&self) -> &TokenStore {
        &self.store
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        let builder = self
            .http
            .request(method, self.url(path))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, USER_AGENT);
        match self.store.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path), path).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(self.request(Method::POST, path).json(body), path)
            .await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::POST, path), path).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(self.request(Method::PATCH, path).json(body), path)
            .await
    }

    /// POST without a body whose response body, if any, is ignored.
    pub(crate) async fn post_discarding(&self, path: &str) -> Result<()> {
        self.checked(self.request(Method::POST, path), path)
            .await
            .map(drop)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> Result<T> {
        self.checked(builder, path)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {path}"))
    }

    async fn checked(&self, builder: RequestBuilder, path: &str) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to send request to {path}"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_response(status, &body);
        tracing::debug!(path, status = status.as_u16(), message = %error.message, "api error");
        Err(error.into())
    }
}
