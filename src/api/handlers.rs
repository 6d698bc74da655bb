//! HTTP handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::state::AppState;
use crate::auth::CurrentUser;
use crate::user::{RegisterRequest, UserInfo};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness probe, public.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /auth/signup: register a new account.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserInfo>)> {
    let user = state.accounts.register(request).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

/// Login request body. The identifier may be an email or a username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Login response: the bearer token plus its owner.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// POST /auth/login: verify credentials and mint a token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (token, user) = state
        .authenticator
        .login(&request.identifier, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// POST /auth/verify: confirm an email address by verification code.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<UserInfo>> {
    let user = state.accounts.verify_email(&request.code).await?;
    Ok(Json(UserInfo::from(&user)))
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    pub email: String,
}

/// POST /auth/resend: send a fresh verification code.
pub async fn resend_code(
    State(state): State<AppState>,
    Json(request): Json<ResendRequest>,
) -> ApiResult<StatusCode> {
    state.accounts.resend_code(&request.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me: the authenticated caller's own account.
///
/// [`CurrentUser`] owns the 401 when the gate attached no identity.
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserInfo> {
    Json(UserInfo::from(&user))
}
