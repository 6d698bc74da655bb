//! Account data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored principal: the identity record used for authentication.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    /// Pending email-verification code, cleared once the address is verified.
    pub verification_code: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identifier token subjects are matched against.
    ///
    /// Tokens are minted with the email as subject and the gate resolves
    /// principals by email, so this is the email.
    pub fn canonical_identifier(&self) -> &str {
        &self.email
    }

    /// Whether the account may authenticate. Account suspension is not
    /// implemented; every account is enabled.
    pub fn is_enabled(&self) -> bool {
        true
    }

    /// Whether the account is locked. Always false, see [`User::is_enabled`].
    pub fn is_locked(&self) -> bool {
        false
    }

    /// Whether the stored credentials have expired. Always false.
    pub fn credentials_expired(&self) -> bool {
        false
    }

    /// Whether the email address has a pending verification code.
    pub fn is_verified(&self) -> bool {
        self.verification_code.is_none()
    }
}

/// Public view of an account, safe to return from the API.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            verified: user.is_verified(),
            created_at: user.created_at,
        }
    }
}

/// Self-service registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Repository-level insert. The password is already hashed by the time a
/// request reaches the repository.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<String>,
    pub verification_code: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "usr_test".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            role: "user".to_string(),
            verification_code: Some("123456".to_string()),
            verification_expires_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_account_flags_are_fixed() {
        // No suspension logic exists: every account reports the same flags.
        let user = sample_user();
        assert!(user.is_enabled());
        assert!(!user.is_locked());
        assert!(!user.credentials_expired());
    }

    #[test]
    fn test_canonical_identifier_is_email() {
        let user = sample_user();
        assert_eq!(user.canonical_identifier(), "alice@example.com");
    }

    #[test]
    fn test_verified_tracks_pending_code() {
        let mut user = sample_user();
        assert!(!user.is_verified());

        user.verification_code = None;
        assert!(user.is_verified());
    }
}
