//! Account workflow: registration and email verification.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{info, instrument, warn};

use super::models::{CreateUserRequest, RegisterRequest, User};
use super::repository::UserRepository;
use crate::mail::MailTransport;

/// How long a verification code stays usable.
const VERIFICATION_CODE_TTL_MINUTES: i64 = 15;

/// Service for account registration and email verification.
#[derive(Clone)]
pub struct AccountService {
    repo: UserRepository,
    mailer: Arc<dyn MailTransport>,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(repo: UserRepository, mailer: Arc<dyn MailTransport>) -> Self {
        Self { repo, mailer }
    }

    /// Register a new account and send its verification code.
    ///
    /// Mail delivery is fire-and-forget: a relay failure is logged and the
    /// registration still succeeds.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        if !is_valid_username(&request.username) {
            bail!(
                "Invalid username format. Must be 3-50 alphanumeric characters, underscores, or hyphens."
            );
        }

        if !is_valid_email(&request.email) {
            bail!("Invalid email format.");
        }

        if request.password.len() < 6 {
            bail!("Password must be at least 6 characters.");
        }

        if !self.repo.is_username_available(&request.username).await? {
            bail!("Username '{}' is already taken.", request.username);
        }

        if !self.repo.is_email_available(&request.email).await? {
            bail!("Email '{}' is already registered.", request.email);
        }

        let code = generate_verification_code();
        let expires_at = Utc::now() + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES);

        let user = self
            .repo
            .create(CreateUserRequest {
                username: request.username,
                email: request.email,
                password_hash: hash_password(&request.password)?,
                role: None,
                verification_code: Some(code.clone()),
                verification_expires_at: Some(expires_at),
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "Registered new account");
        self.send_code(&user.email, &code).await;

        Ok(user)
    }

    /// Verify an email address by its pending code.
    #[instrument(skip(self, code))]
    pub async fn verify_email(&self, code: &str) -> Result<User> {
        let user = self
            .repo
            .find_by_verification_code(code)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Verification code not found."))?;

        if let Some(expires_at) = user.verification_expires_at {
            if expires_at < Utc::now() {
                bail!("Verification code has expired.");
            }
        }

        self.repo.mark_verified(&user.id).await?;
        info!(user_id = %user.id, "Verified email address");

        self.repo
            .get(&user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after verification"))
    }

    /// Issue a fresh verification code for an unverified account.
    #[instrument(skip(self))]
    pub async fn resend_code(&self, email: &str) -> Result<()> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Account not found."))?;

        if user.is_verified() {
            bail!("Account is already verified.");
        }

        let code = generate_verification_code();
        let expires_at = Utc::now() + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES);
        self.repo
            .set_verification_code(&user.id, &code, expires_at)
            .await?;

        self.send_code(&user.email, &code).await;
        Ok(())
    }

    async fn send_code(&self, to: &str, code: &str) {
        let body = format!("Your verification code is {code}. It expires in 15 minutes.");
        if let Err(err) = self.mailer.send(to, "Verify your account", &body).await {
            warn!(to = %to, error = %err, "Failed to send verification email");
        }
    }
}

/// Validate username format.
fn is_valid_username(username: &str) -> bool {
    let len = username.len();
    if !(3..=50).contains(&len) {
        return false;
    }

    username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    !parts[0].is_empty() && parts[1].contains('.')
}

/// Six-digit verification code, zero-padded.
fn generate_verification_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000))
}

/// Hash a password using bcrypt.
pub(crate) fn hash_password(password: &str) -> Result<String> {
    // Lower cost factor keeps debug builds and tests fast.
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Verify a password against a bcrypt hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}
