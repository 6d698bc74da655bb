//! Gatehouse backend library.
//!
//! Core components for the user-account and authentication backend:
//! token issuance and validation, the per-request authentication gate,
//! and the account registration/verification workflow.

pub mod api;
pub mod auth;
pub mod db;
pub mod mail;
pub mod user;
