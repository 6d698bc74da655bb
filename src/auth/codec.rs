//! Token codec: symmetric signing and verification of JWTs.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::claims::{ClaimName, ClaimValue, Claims};
use super::config::{AuthConfig, ConfigValidationError};
use super::error::AuthError;
use crate::user::User;

/// Signs and verifies the compact `header.payload.signature` tokens the
/// service hands out at login.
///
/// Verification here means signature only: expired tokens still decode,
/// and expiry is answered separately by [`TokenCodec::is_expired`]. The
/// signing key is derived once from the base64 configuration secret and
/// shared read-only across requests.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from the auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        let key_bytes = config.decoded_secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is a separate boolean query, not a decode failure.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = Default::default();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&key_bytes),
            decoding_key: DecodingKey::from_secret(&key_bytes),
            validation,
            token_ttl: Duration::milliseconds(config.expiration_ms as i64),
        })
    }

    /// The configured token lifetime.
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issue a signed token for `subject` with the given extra claims and
    /// lifetime. `iat` is now, `exp` is now plus `ttl`.
    pub fn issue(
        &self,
        subject: &str,
        extra: HashMap<String, serde_json::Value>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Internal(format!("failed to sign token: {err}")))
    }

    /// Issue a token with the configured lifetime and no extra claims.
    pub fn issue_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, HashMap::new(), self.token_ttl)
    }

    /// Parse a token and verify its signature.
    ///
    /// Every signature or parse failure collapses into
    /// [`AuthError::InvalidToken`]; an expired but well-signed token
    /// decodes successfully.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))
    }

    /// Extract one of the fixed claims from a verified token.
    pub fn extract_claim(&self, token: &str, name: ClaimName) -> Result<ClaimValue, AuthError> {
        Ok(self.decode(token)?.claim(name))
    }

    /// Extract the subject from a verified token.
    pub fn extract_subject(&self, token: &str) -> Result<String, AuthError> {
        Ok(self.decode(token)?.sub)
    }

    /// Whether the token's embedded expiry is strictly in the past.
    pub fn is_expired(&self, token: &str) -> Result<bool, AuthError> {
        Ok(self.decode(token)?.exp < Utc::now().timestamp())
    }

    /// Whether the token authenticates `principal`: the subject must equal
    /// the principal's canonical identifier and the token must not be
    /// expired.
    pub fn is_valid_for(&self, token: &str, principal: &User) -> Result<bool, AuthError> {
        let claims = self.decode(token)?;
        let subject_matches = claims.sub == principal.canonical_identifier();
        let expired = claims.exp < Utc::now().timestamp();
        Ok(subject_matches && !expired)
    }
}
