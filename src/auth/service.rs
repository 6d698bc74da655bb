//! Credential verification and token minting.

use std::sync::Arc;

use tracing::{info, instrument};

use super::codec::TokenCodec;
use super::error::AuthError;
use crate::user::{User, UserRepository, verify_password};

/// Verifies login attempts against the account store and mints tokens.
#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    codec: Arc<TokenCodec>,
}

impl Authenticator {
    /// Create a new authenticator.
    pub fn new(users: UserRepository, codec: Arc<TokenCodec>) -> Self {
        Self { users, codec }
    }

    /// Verify `identifier`/`password` and mint a token on success.
    ///
    /// The identifier may be either lookup key (email or username); the
    /// minted token's subject is always the principal's email. Exactly one
    /// store lookup and one hash comparison per attempt, no retries.
    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(String, User), AuthError> {
        let user = self
            .users
            .find_by_identifier(identifier)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
            .ok_or(AuthError::UserNotFound)?;

        let matches = verify_password(password, &user.password_hash)
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.codec.issue_default(&user.email)?;
        info!(user_id = %user.id, "Issued login token");

        Ok((token, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::AuthConfig;
    use crate::db::Database;
    use crate::user::CreateUserRequest;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    async fn setup() -> (Authenticator, Arc<TokenCodec>, UserRepository) {
        let db = Database::in_memory().await.unwrap();
        let users = UserRepository::new(db.pool().clone());

        let codec = Arc::new(
            TokenCodec::new(&AuthConfig {
                secret: BASE64.encode([9u8; 32]),
                expiration_ms: 3_600_000,
            })
            .unwrap(),
        );

        (
            Authenticator::new(users.clone(), codec.clone()),
            codec,
            users,
        )
    }

    async fn seed_user(users: &UserRepository, username: &str, email: &str, password: &str) {
        users
            .create(CreateUserRequest {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: bcrypt::hash(password, 4).unwrap(),
                role: None,
                verification_code: None,
                verification_expires_at: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_login_unknown_identifier() {
        let (auth, _, _) = setup().await;

        let err = auth.login("nobody@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (auth, _, users) = setup().await;
        seed_user(&users, "alice", "alice@example.com", "correct horse").await;

        let err = auth.login("alice@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_success_subject_is_email() {
        let (auth, codec, users) = setup().await;
        seed_user(&users, "alice", "alice@example.com", "correct horse").await;

        let (token, user) = auth.login("alice@example.com", "correct horse").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(codec.extract_subject(&token).unwrap(), "alice@example.com");
        assert!(codec.is_valid_for(&token, &user).unwrap());
    }

    #[tokio::test]
    async fn test_login_by_username() {
        let (auth, codec, users) = setup().await;
        seed_user(&users, "alice", "alice@example.com", "correct horse").await;

        // Username is the second lookup key; the subject is still the email.
        let (token, _) = auth.login("alice", "correct horse").await.unwrap();
        assert_eq!(codec.extract_subject(&token).unwrap(), "alice@example.com");
    }
}
