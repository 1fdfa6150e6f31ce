//! Wire types for the auth and user endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Backend user identifier; numeric or string depending on the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// The authenticated user's record.
///
/// Only `id` is guaranteed; everything else depends on how the account was
/// created. Unknown fields are preserved so a stored record round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// How the account authenticates ("local", "google", ...)
    #[serde(
        default,
        alias = "authProvider",
        rename = "provider",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Minimal record carrying only an id.
    pub fn with_id(id: UserId) -> Self {
        Self {
            id,
            email: None,
            login: None,
            name: None,
            second_name: None,
            roles: Vec::new(),
            provider: None,
            avatar: None,
            extra: Map::new(),
        }
    }

    /// Best human-readable label: full name, then login, then email, then id.
    pub fn display_name(&self) -> String {
        let full = [self.name.as_deref(), self.second_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        self.login
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

/// Form submitted on the code-verification step of registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub second_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefon_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub code: &'a str,
    pub new_password: &'a str,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendCodeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub user: User,
    /// Present only on deployments that sign in right after registration.
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleStatus {
    pub is_linked: bool,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub last_google_login: Option<String>,
    #[serde(default)]
    pub has_valid_token: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLinkResponse {
    #[serde(default)]
    pub message: String,
    pub link_url: String,
}

/// Partial profile update; absent fields are left unchanged server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefon_number: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.login.is_none()
            && self.name.is_none()
            && self.second_name.is_none()
            && self.age.is_none()
            && self.telefon_number.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_with_only_id_parses() {
        let user: User = serde_json::from_str(r#"{"id":1}"#).unwrap();
        assert_eq!(user.id, UserId::Number(1));
        assert!(user.roles.is_empty());
        assert_eq!(user.display_name(), "1");
    }

    #[test]
    fn test_user_keeps_unknown_fields() {
        let raw = r#"{"id":"u-7","email":"a@b.com","authProvider":"google","streak":12}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.id, UserId::Text("u-7".to_string()));
        assert_eq!(user.provider.as_deref(), Some("google"));
        assert_eq!(user.extra.get("streak"), Some(&Value::from(12)));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["streak"], 12);
        assert_eq!(back["email"], "a@b.com");
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let mut user = User::with_id(UserId::Number(3));
        user.login = Some("ivan".to_string());
        assert_eq!(user.display_name(), "ivan");
        user.name = Some("Ivan".to_string());
        user.second_name = Some("Petrov".to_string());
        assert_eq!(user.display_name(), "Ivan Petrov");
    }

    #[test]
    fn test_register_form_omits_absent_optionals() {
        let form = RegisterForm {
            email: "a@b.com".to_string(),
            code: Some("123456".to_string()),
            name: Some("A".to_string()),
            second_name: Some("B".to_string()),
            age: None,
            telefon_number: None,
        };
        let json = serde_json::to_value(&form).unwrap();
        assert!(json.get("age").is_none());
        assert!(json.get("telefon_number").is_none());
        assert_eq!(json["second_name"], "B");
    }

    #[test]
    fn test_google_status_camel_case() {
        let status: GoogleStatus =
            serde_json::from_str(r#"{"isLinked":true,"googleId":"g1","hasValidToken":false}"#)
                .unwrap();
        assert!(status.is_linked);
        assert_eq!(status.google_id.as_deref(), Some("g1"));
        assert_eq!(status.last_google_login, None);
    }
}
