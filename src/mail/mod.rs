//! Outbound mail boundary.
//!
//! The core never talks SMTP itself; verification codes leave through the
//! [`MailTransport`] trait and delivery is fire-and-forget. [`LogMailer`]
//! is the development transport that writes messages to the log instead.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Mail relay connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub from: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: "noreply@localhost".to_string(),
        }
    }
}

/// Transport for outbound mail. Implementations own delivery, retries and
/// connection management; callers treat `send` as a single attempt.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Development transport: logs the message instead of delivering it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(to = %to, subject = %subject, body = %body, "mail (log transport)");
        Ok(())
    }
}
