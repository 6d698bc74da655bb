//! Authentication module.
//!
//! Provides the token codec (issue/verify/expiry), the credential-verifying
//! authenticator, and the per-request gate middleware that establishes the
//! request-scoped identity context.

mod claims;
mod codec;
mod config;
mod error;
mod middleware;
mod service;

pub use claims::{ClaimName, ClaimValue, Claims};
pub use codec::TokenCodec;
pub use config::{AuthConfig, ConfigValidationError};
pub use error::AuthError;
pub use middleware::{AuthContext, AuthState, CurrentUser, ValidationOutcome, auth_gate};
pub use service::Authenticator;
