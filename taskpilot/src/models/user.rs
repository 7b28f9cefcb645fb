//! User profile and authentication payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type
pub type UserId = i64;

/// Authenticated user's profile, owned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl UserProfile {
    /// Name to show in a UI: full name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Tokens and profile returned by login and registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: UserProfile,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Body of `POST /api/v1/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// The refresh endpoint only issues a new access token; the refresh token is
/// not rotated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

/// Body of `POST /api/v1/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Partial profile update; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_profile_defaults_optional_fields() {
        let user: UserProfile = serde_json::from_value(json!({
            "id": 7,
            "email": "ada@example.com",
            "username": "ada",
            "created_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.id, 7);
        assert!(user.is_active);
        assert!(!user.is_admin);
        assert!(user.full_name.is_none());
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let mut user: UserProfile = serde_json::from_value(json!({
            "id": 1,
            "email": "ada@example.com",
            "username": "ada",
            "full_name": "Ada Lovelace",
            "created_at": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "Ada Lovelace");

        user.full_name = Some("  ".to_string());
        assert_eq!(user.display_name(), "ada");
    }

    #[test]
    fn test_register_request_omits_missing_full_name() {
        let request = RegisterRequest {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            password: "Secret123!".to_string(),
            full_name: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("full_name").is_none());
    }

    #[test]
    fn test_refresh_response_without_token_type() {
        let response: RefreshResponse =
            serde_json::from_value(json!({ "access_token": "A2" })).unwrap();
        assert_eq!(response.access_token, "A2");
        assert_eq!(response.token_type, "bearer");
    }
}
