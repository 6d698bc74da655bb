//! Account management module.
//!
//! Owns the principal records the authentication core reads, plus the
//! registration and email-verification workflow that writes them.

mod models;
mod repository;
mod service;

pub use models::{CreateUserRequest, RegisterRequest, User, UserInfo};
pub use repository::UserRepository;
pub use service::AccountService;
pub(crate) use service::verify_password;
