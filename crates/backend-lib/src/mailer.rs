// ============================
// crates/backend-lib/src/mailer.rs
// ============================
//! Outbound mail port.
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::AppError;

/// Delivers verification links to account owners
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), AppError>;
}

/// Mailer that writes the verification link to the log instead of sending it
#[derive(Debug, Clone)]
pub struct LogMailer {
    base_url: String,
}

impl LogMailer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/users/verify?token={token}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), AppError> {
        info!(%email, "verification email queued");
        debug!(link = %self.verification_link(token), "verification link");
        Ok(())
    }
}
