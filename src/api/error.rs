//! Unified API error handling with structured responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Conflict(_) => "CONFLICT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Categorize an anyhow error from the account workflow into the
    /// appropriate ApiError variant, by message pattern:
    ///
    /// - "not found" -> NotFound
    /// - "already taken" / "already registered" / "already verified" -> Conflict
    /// - "invalid" / "must be" / "expired" -> BadRequest
    /// - "unavailable" / "connection refused" -> ServiceUnavailable
    /// - default -> Internal
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let msg = err.to_string();
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("not found") {
            ApiError::NotFound(msg)
        } else if msg_lower.contains("already taken")
            || msg_lower.contains("already registered")
            || msg_lower.contains("already verified")
        {
            ApiError::Conflict(msg)
        } else if msg_lower.contains("invalid")
            || msg_lower.contains("must be")
            || msg_lower.contains("expired")
        {
            ApiError::BadRequest(msg)
        } else if msg_lower.contains("unavailable") || msg_lower.contains("connection refused") {
            ApiError::ServiceUnavailable(msg)
        } else {
            ApiError::Internal(msg)
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        match &self {
            ApiError::Internal(msg) => {
                error!(error_code = code, message = %msg, "API error");
            }
            ApiError::ServiceUnavailable(msg) => {
                warn!(error_code = code, message = %msg, "Service unavailable");
            }
            _ => {
                tracing::debug!(error_code = code, message = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            error: message,
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::from_anyhow(err)
    }
}

/// Convert auth errors to API errors.
///
/// `UserNotFound` and `InvalidCredentials` deliberately collapse into the
/// same response so the login endpoint does not leak which identifiers
/// exist.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserNotFound | AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(format!("Invalid token: {msg}")),
            AuthError::Internal(msg) => ApiError::Internal(format!("Authentication error: {msg}")),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization_not_found() {
        let err = anyhow::anyhow!("Verification code not found.");
        assert!(matches!(ApiError::from_anyhow(err), ApiError::NotFound(_)));
    }

    #[test]
    fn test_error_categorization_conflict_taken() {
        let err = anyhow::anyhow!("Username 'admin' is already taken.");
        assert!(matches!(ApiError::from_anyhow(err), ApiError::Conflict(_)));
    }

    #[test]
    fn test_error_categorization_conflict_registered() {
        let err = anyhow::anyhow!("Email 'user@example.com' is already registered.");
        assert!(matches!(ApiError::from_anyhow(err), ApiError::Conflict(_)));
    }

    #[test]
    fn test_error_categorization_bad_request_invalid() {
        let err = anyhow::anyhow!("Invalid username format.");
        assert!(matches!(
            ApiError::from_anyhow(err),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_error_categorization_bad_request_expired() {
        let err = anyhow::anyhow!("Verification code has expired.");
        assert!(matches!(
            ApiError::from_anyhow(err),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_error_categorization_internal_default() {
        let err = anyhow::anyhow!("Something went wrong");
        assert!(matches!(ApiError::from_anyhow(err), ApiError::Internal(_)));
    }

    #[test]
    fn test_auth_errors_do_not_leak_identifier_existence() {
        let not_found: ApiError = AuthError::UserNotFound.into();
        let bad_password: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(not_found.to_string(), bad_password.to_string());
    }

    #[test]
    fn test_error_response_status_codes() {
        assert_eq!(ApiError::not_found("").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::bad_request("").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::conflict("").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::internal("").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
