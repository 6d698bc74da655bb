//! Test utilities and common setup.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use gatehouse::api::{self, AppState};
use gatehouse::auth::{AuthConfig, AuthState, Authenticator, TokenCodec};
use gatehouse::db::Database;
use gatehouse::mail::MailTransport;
use gatehouse::user::{AccountService, UserRepository};

/// Mail transport that records every message instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, to: &str, _subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

impl RecordingMailer {
    /// Pull the 6-digit verification code out of the latest message to `to`.
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(addr, _)| addr == to)
            .and_then(|(_, body)| {
                body.split_whitespace()
                    .find(|word| word.len() >= 6 && word.chars().take(6).all(|c| c.is_ascii_digit()))
                    .map(|word| word.chars().take(6).collect())
            })
    }
}

/// Everything a test needs to drive the service and peek behind it.
pub struct TestContext {
    pub app: Router,
    pub codec: Arc<TokenCodec>,
    pub users: UserRepository,
    pub mailer: Arc<RecordingMailer>,
}

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        secret: BASE64.encode([11u8; 32]),
        expiration_ms: 3_600_000,
    }
}

/// Create a test application with all services over an in-memory database.
pub async fn test_context() -> TestContext {
    let db = Database::in_memory().await.unwrap();
    let users = UserRepository::new(db.pool().clone());

    let codec = Arc::new(TokenCodec::new(&test_auth_config()).unwrap());
    let auth_state = AuthState {
        codec: codec.clone(),
        users: users.clone(),
    };

    let authenticator = Authenticator::new(users.clone(), codec.clone());
    let mailer = Arc::new(RecordingMailer::default());
    let accounts = AccountService::new(users.clone(), mailer.clone());

    let state = AppState::new(accounts, authenticator, auth_state);

    TestContext {
        app: api::create_router(state),
        codec,
        users,
        mailer,
    }
}
