//! Authentication configuration.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum decoded key length for HMAC-SHA256.
const MIN_SECRET_BYTES: usize = 32;

fn default_expiration_ms() -> u64 {
    3_600_000
}

/// Settings for token signing and lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base64-encoded HMAC signing key.
    pub secret: String,

    /// Token lifetime in milliseconds.
    #[serde(default = "default_expiration_ms")]
    pub expiration_ms: u64,
}

/// Problems with the configured signing material.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("auth secret is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("auth secret decodes to {0} bytes, need at least {MIN_SECRET_BYTES}")]
    SecretTooShort(usize),

    #[error("token expiration must be greater than zero")]
    ZeroExpiration,
}

impl AuthConfig {
    /// Decode the base64 secret into raw key bytes, enforcing a minimum
    /// key length.
    pub fn decoded_secret(&self) -> Result<Vec<u8>, ConfigValidationError> {
        let bytes = BASE64.decode(self.secret.trim())?;
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(ConfigValidationError::SecretTooShort(bytes.len()));
        }
        Ok(bytes)
    }

    /// Validate the whole section.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.decoded_secret()?;
        if self.expiration_ms == 0 {
            return Err(ConfigValidationError::ZeroExpiration);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        BASE64.encode(bytes)
    }

    #[test]
    fn test_valid_secret() {
        let config = AuthConfig {
            secret: encode(&[7u8; 32]),
            expiration_ms: 1000,
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.decoded_secret().unwrap().len(), 32);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = AuthConfig {
            secret: encode(&[7u8; 16]),
            expiration_ms: 1000,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::SecretTooShort(16))
        ));
    }

    #[test]
    fn test_garbage_secret_rejected() {
        let config = AuthConfig {
            secret: "not base64 !!!".to_string(),
            expiration_ms: 1000,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_zero_expiration_rejected() {
        let config = AuthConfig {
            secret: encode(&[7u8; 32]),
            expiration_ms: 0,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroExpiration)
        ));
    }
}
