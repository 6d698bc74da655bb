//! Router wiring.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::state::AppState;
use crate::auth::auth_gate;

/// Build the application router.
///
/// The gate runs on every route; pass-through semantics keep the public
/// routes public and `/users/me` enforces authentication at the handler.
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth.clone();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/verify", post(handlers::verify_email))
        .route("/auth/resend", post(handlers::resend_code))
        .route("/users/me", get(handlers::me))
        .layer(middleware::from_fn_with_state(auth_state, auth_gate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
