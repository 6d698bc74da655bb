//! Authentication error taxonomy.

use thiserror::Error;

/// Errors produced by the authentication core.
///
/// Token expiry is deliberately not a variant: an expired token parses
/// fine and expiry is answered by [`crate::auth::TokenCodec::is_expired`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// No principal exists for the supplied identifier.
    #[error("user not found")]
    UserNotFound,

    /// The password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Signature verification or token parsing failed.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Store or hashing failure unrelated to the credentials themselves.
    #[error("authentication error: {0}")]
    Internal(String),
}
