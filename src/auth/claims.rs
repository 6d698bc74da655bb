//! JWT claims and the enumerated claim accessor.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Claims embedded in every token this service issues.
///
/// `sub` carries the principal's email. Extra claims are kept as a flat
/// map so callers can attach arbitrary fields at issue time; in practice
/// the map is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's email address.
    pub sub: String,

    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,

    /// Caller-supplied extra claims, flattened into the payload.
    #[serde(flatten, default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// The fixed claim set callers actually read.
///
/// Replaces the original design's higher-order claims-resolver function
/// with a plain enumerated accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimName {
    Subject,
    IssuedAt,
    Expiration,
}

/// A claim value pulled out of a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    Text(String),
    Timestamp(i64),
}

impl ClaimValue {
    /// The textual value, if this claim is textual.
    pub fn into_text(self) -> Option<String> {
        match self {
            ClaimValue::Text(value) => Some(value),
            ClaimValue::Timestamp(_) => None,
        }
    }

    /// The timestamp value, if this claim is a timestamp.
    pub fn into_timestamp(self) -> Option<i64> {
        match self {
            ClaimValue::Timestamp(value) => Some(value),
            ClaimValue::Text(_) => None,
        }
    }
}

impl Claims {
    /// Read one of the fixed claims.
    pub fn claim(&self, name: ClaimName) -> ClaimValue {
        match name {
            ClaimName::Subject => ClaimValue::Text(self.sub.clone()),
            ClaimName::IssuedAt => ClaimValue::Timestamp(self.iat),
            ClaimName::Expiration => ClaimValue::Timestamp(self.exp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Claims {
        Claims {
            sub: "user@example.com".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn test_claim_accessor() {
        let claims = sample();
        assert_eq!(
            claims.claim(ClaimName::Subject),
            ClaimValue::Text("user@example.com".to_string())
        );
        assert_eq!(
            claims.claim(ClaimName::IssuedAt),
            ClaimValue::Timestamp(1_700_000_000)
        );
        assert_eq!(
            claims.claim(ClaimName::Expiration),
            ClaimValue::Timestamp(1_700_003_600)
        );
    }

    #[test]
    fn test_claim_value_conversions() {
        assert_eq!(
            ClaimValue::Text("a".to_string()).into_text(),
            Some("a".to_string())
        );
        assert_eq!(ClaimValue::Text("a".to_string()).into_timestamp(), None);
        assert_eq!(ClaimValue::Timestamp(7).into_timestamp(), Some(7));
        assert_eq!(ClaimValue::Timestamp(7).into_text(), None);
    }

    #[test]
    fn test_extra_claims_flatten() {
        let mut claims = sample();
        claims
            .extra
            .insert("tenant".to_string(), serde_json::json!("acme"));

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["tenant"], "acme");
        assert_eq!(json["sub"], "user@example.com");

        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back.extra["tenant"], serde_json::json!("acme"));
    }
}
