//! Application state shared across handlers.

use crate::auth::{AuthState, Authenticator};
use crate::user::AccountService;

/// Shared state for the API layer.
///
/// Everything in here is cheap to clone: services hold pool handles and
/// the signing key sits behind an `Arc` inside [`AuthState`].
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub authenticator: Authenticator,
    pub auth: AuthState,
}

impl AppState {
    /// Create the application state.
    pub fn new(accounts: AccountService, authenticator: Authenticator, auth: AuthState) -> Self {
        Self {
            accounts,
            authenticator,
            auth,
        }
    }
}
