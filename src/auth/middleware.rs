//! Per-request authentication gate.
//!
//! The gate inspects the `Authorization` header, validates the bearer
//! token, and attaches an [`AuthContext`] request extension on success.
//! It never rejects a request itself: every failure path forwards the
//! request unauthenticated and leaves the access decision to route-level
//! authorization (the [`CurrentUser`] extractor).

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::codec::TokenCodec;
use super::error::AuthError;
use crate::api::ApiError;
use crate::user::{User, UserRepository};

/// Bearer scheme marker, including the trailing space.
const BEARER_PREFIX: &str = "Bearer ";

/// Read-only state the gate needs: the signing key material and the
/// principal store. Shared across all requests.
#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub users: UserRepository,
}

/// Request-scoped identity context.
///
/// Inserted at most once per request by the gate, dropped with the
/// request. Carried as a request extension, never as ambient state.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// Granted authorities. No role-to-authority mapping is implemented,
    /// so this is always empty.
    pub authorities: Vec<String>,
}

/// Result of one validation pass over a bearer token.
#[derive(Debug)]
pub enum ValidationOutcome {
    Authenticated(User),
    Unauthenticated,
}

/// Authentication gate middleware.
///
/// Single pass, no retries: one token decode and at most one principal
/// lookup per request.
pub async fn auth_gate(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Duplicate gate execution: keep the existing context as-is.
    if request.extensions().get::<AuthContext>().is_some() {
        return next.run(request).await;
    }

    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX));

    let outcome = match bearer {
        // No bearer token: public routes are legal, forward unchanged.
        None => ValidationOutcome::Unauthenticated,
        Some(token) => match validate_bearer(&state, token).await {
            Ok(outcome) => outcome,
            Err(err) => {
                report_failure(&err);
                ValidationOutcome::Unauthenticated
            }
        },
    };

    if let ValidationOutcome::Authenticated(user) = outcome {
        request.extensions_mut().insert(AuthContext {
            user,
            authorities: Vec::new(),
        });
    }

    next.run(request).await
}

/// Decode the token, resolve its subject against the account store, and
/// check token validity for the resolved principal.
async fn validate_bearer(state: &AuthState, token: &str) -> Result<ValidationOutcome, AuthError> {
    let subject = state.codec.extract_subject(token)?;

    let principal = state
        .users
        .find_by_email(&subject)
        .await
        .map_err(|err| AuthError::Internal(err.to_string()))?;

    let Some(principal) = principal else {
        debug!(subject = %subject, "Token subject does not resolve to an account");
        return Ok(ValidationOutcome::Unauthenticated);
    };

    if state.codec.is_valid_for(token, &principal)? {
        Ok(ValidationOutcome::Authenticated(principal))
    } else {
        Ok(ValidationOutcome::Unauthenticated)
    }
}

/// Centralized sink for gate failures. The request still passes through
/// unauthenticated; this only decides how loudly to log.
fn report_failure(err: &AuthError) {
    match err {
        AuthError::Internal(message) => {
            warn!(error = %message, "Authentication gate store failure");
        }
        other => {
            debug!(error = %other, "Rejected bearer token");
        }
    }
}

/// Route-level extractor for handlers that require an authenticated
/// caller. This is where a missing identity finally becomes a 401.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .map(|ctx| CurrentUser(ctx.user.clone()))
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
