//! Error taxonomy for backend calls.
//!
//! Service methods return `anyhow::Result`. The two known failure kinds travel
//! inside it as concrete types so callers can tell them apart with
//! `downcast_ref`:
//! - [`ApiError`]: the backend answered with a non-2xx status
//! - [`ValidationError`]: input was rejected locally, no request was made
//!
//! Anything else (transport failure, malformed success body) is an unknown
//! error and is shown to users only through [`display_message`].

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown for errors that are neither API nor validation errors.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Normalized representation of a failed backend call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

impl ApiError {
    /// Builds an error from a non-2xx response body.
    ///
    /// Accepts `{statusCode, message, error}` bodies where `message` is either a
    /// string or a list of strings. Falls back to the HTTP status and its
    /// reason phrase when the body does not parse.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        Self::parse_body(status, body).unwrap_or_else(|| Self::from_status(status))
    }

    /// Synthesizes an error from the status line alone.
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown Error");
        Self {
            status_code: status.as_u16(),
            message: reason.to_string(),
            error: "HttpError".to_string(),
        }
    }

    fn parse_body(status: StatusCode, body: &str) -> Option<Self> {
        let json: Value = serde_json::from_str(body).ok()?;
        let message = match json.get("message")? {
            Value::String(message) => message.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            _ => return None,
        };
        let status_code = json
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or_else(|| status.as_u16());
        let error = json
            .get("error")
            .and_then(Value::as_str)
            .map_or_else(
                || status.canonical_reason().unwrap_or("Error").to_string(),
                ToString::to_string,
            );

        Some(Self {
            status_code,
            message,
            error,
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Input rejected before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required form field was empty or absent.
    MissingField(&'static str),
    /// New password and its confirmation differ.
    PasswordMismatch,
    /// A wizard step was submitted before the one it depends on.
    OutOfOrder,
}

impl ValidationError {
    /// User-facing text for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "Please fill in all required fields",
            ValidationError::PasswordMismatch => "Passwords do not match",
            ValidationError::OutOfOrder => "Please complete the previous step first",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ValidationError::PasswordMismatch | ValidationError::OutOfOrder => {
                write!(f, "{}", self.user_message())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks that a required field is present and not blank.
///
/// # Errors
/// Returns [`ValidationError::MissingField`] naming `field`.
pub fn require(value: Option<&str>, field: &'static str) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Maps any error to the string a view should display.
pub fn display_message(error: &anyhow::Error) -> String {
    if let Some(api) = error.downcast_ref::<ApiError>() {
        return api.message.clone();
    }
    if let Some(validation) = error.downcast_ref::<ValidationError>() {
        return validation.user_message().to_string();
    }
    GENERIC_ERROR_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_parses_error_body() {
        let err = ApiError::from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"statusCode":401,"message":"Invalid credentials","error":"Unauthorized"}"#,
        );
        assert_eq!(err.status_code, 401);
        assert_eq!(err.message, "Invalid credentials");
        assert_eq!(err.error, "Unauthorized");
    }

    #[test]
    fn test_from_response_joins_message_list() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            r#"{"statusCode":400,"message":["email must be an email","code should not be empty"],"error":"Bad Request"}"#,
        );
        assert_eq!(
            err.message,
            "email must be an email, code should not be empty"
        );
    }

    #[test]
    fn test_from_response_fills_missing_fields_from_status() {
        let err = ApiError::from_response(StatusCode::CONFLICT, r#"{"message":"Email taken"}"#);
        assert_eq!(err.status_code, 409);
        assert_eq!(err.message, "Email taken");
        assert_eq!(err.error, "Conflict");
    }

    #[test]
    fn test_from_response_falls_back_on_unparseable_body() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.status_code, 502);
        assert_eq!(err.message, "Bad Gateway");
        assert_eq!(err.error, "HttpError");

        let err = ApiError::from_response(StatusCode::NOT_FOUND, r#"{"detail":"nope"}"#);
        assert_eq!(err.message, "Not Found");
    }

    #[test]
    fn test_display_message_by_kind() {
        let api: anyhow::Error = ApiError::from_status(StatusCode::FORBIDDEN).into();
        assert_eq!(display_message(&api), "Forbidden");

        let local: anyhow::Error = ValidationError::PasswordMismatch.into();
        assert_eq!(display_message(&local), "Passwords do not match");

        let local: anyhow::Error = ValidationError::MissingField("name").into();
        assert_eq!(display_message(&local), "Please fill in all required fields");

        let other = anyhow::anyhow!("connection refused");
        assert_eq!(display_message(&other), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_display_message_sees_through_context() {
        let err = anyhow::Error::from(ApiError::from_status(StatusCode::UNAUTHORIZED))
            .context("login request");
        assert_eq!(display_message(&err), "Unauthorized");
    }

    #[test]
    fn test_require() {
        assert!(require(Some("x"), "name").is_ok());
        assert_eq!(
            require(Some("  "), "name"),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            require(None, "code"),
            Err(ValidationError::MissingField("code"))
        );
    }
}
