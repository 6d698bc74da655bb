//! Account repository for database operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{CreateUserRequest, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, \
     verification_code, verification_expires_at, created_at";

/// Repository for account database operations.
///
/// Lookups come in three flavours matching how callers resolve principals:
/// by email (token subjects, login), by username (login), and by pending
/// verification code (the email-verification workflow).
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new account repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn generate_id() -> String {
        format!("usr_{}", nanoid::nanoid!(12))
    }

    /// Insert a new account.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let id = Self::generate_id();
        let role = request.role.unwrap_or_else(|| "user".to_string());

        debug!("Creating user: {} ({})", request.username, id);

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role,
                               verification_code, verification_expires_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(&role)
        .bind(&request.verification_code)
        .bind(request.verification_expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))
    }

    /// Get an account by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        Ok(user)
    }

    /// Get an account by email.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by email")?;

        Ok(user)
    }

    /// Get an account by username.
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by username")?;

        Ok(user)
    }

    /// Get an account by its pending verification code.
    #[instrument(skip(self, code))]
    pub async fn find_by_verification_code(&self, code: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE verification_code = ?"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user by verification code")?;

        Ok(user)
    }

    /// Resolve an account by either lookup key: email first, then username.
    #[instrument(skip(self))]
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        if let Some(user) = self.find_by_email(identifier).await? {
            return Ok(Some(user));
        }
        self.find_by_username(identifier).await
    }

    /// Check whether a username is free.
    pub async fn is_username_available(&self, username: &str) -> Result<bool> {
        Ok(self.find_by_username(username).await?.is_none())
    }

    /// Check whether an email is free.
    pub async fn is_email_available(&self, email: &str) -> Result<bool> {
        Ok(self.find_by_email(email).await?.is_none())
    }

    /// Replace the pending verification code and its expiry.
    #[instrument(skip(self, code))]
    pub async fn set_verification_code(
        &self,
        id: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET verification_code = ?, verification_expires_at = ? WHERE id = ?",
        )
        .bind(code)
        .bind(expires_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to set verification code")?;

        Ok(())
    }

    /// Clear the verification columns, marking the address verified.
    #[instrument(skip(self))]
    pub async fn mark_verified(&self, id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET verification_code = NULL, verification_expires_at = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to mark user verified")?;

        Ok(())
    }
}
