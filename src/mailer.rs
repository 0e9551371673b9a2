//! Outbound email collaborator
//!
//! The auth core only needs "send this message, tell me if it failed". Real
//! delivery (SMTP, a SaaS API) lives behind this trait; the service ships with
//! a logging mailer for development and an in-memory outbox for tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::Result;

/// A message handed to the mailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Trait for email delivery backends
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;

    /// Backend name for logging
    fn mailer_name(&self) -> &'static str;
}

/// Writes messages to the log instead of delivering them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        log::info!("Mail to {}: {}", mail.to, mail.subject);
        log::debug!("Mail body: {}", mail.html_body);
        Ok(())
    }

    fn mailer_name(&self) -> &'static str {
        "LOG"
    }
}

/// Collects messages in memory
#[derive(Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox.lock().await.clone()
    }

    pub async fn last(&self) -> Option<OutgoingMail> {
        self.outbox.lock().await.last().cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        self.outbox.lock().await.push(mail);
        Ok(())
    }

    fn mailer_name(&self) -> &'static str {
        "MEMORY"
    }
}

/// Password reset message pointing at the front-end reset page
pub fn password_reset_mail(to: &str, client_origin: &str, raw_token: &str) -> OutgoingMail {
    let link = reset_link(client_origin, raw_token);
    OutgoingMail {
        to: to.to_string(),
        subject: "Password Reset Request".to_string(),
        html_body: format!(
            "You have requested to reset your password. Please click the following link to reset your password: \
             <a href=\"{link}\" target=\"_blank\">Reset Password</a>. \
             If the link is not clickable, please copy and paste it into your browser: {link}"
        ),
    }
}

pub fn reset_link(client_origin: &str, raw_token: &str) -> String {
    format!("{}/reset-password/{}", client_origin, raw_token)
}
