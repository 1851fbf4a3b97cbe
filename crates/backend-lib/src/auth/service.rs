use async_trait::async_trait;
use contacts_common::UserCreate;

use crate::error::AppError;
use crate::models::User;

/// Outcome of redeeming a verification token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailConfirmation {
    Verified,
    AlreadyVerified,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an unverified account and mail it a verification token
    async fn register(&self, body: UserCreate) -> Result<User, AppError>;

    /// Check credentials and issue a session token
    async fn login(&self, email: &str, password: &str) -> Result<String, AppError>;

    /// Account behind a session token
    async fn current_user(&self, session_token: &str) -> Result<User, AppError>;

    /// Redeem an email-verification token
    async fn confirm_email(&self, token: &str) -> Result<EmailConfirmation, AppError>;

    /// Mail a fresh verification token to an unverified account
    async fn request_verification(&self, email: &str) -> Result<(), AppError>;

    async fn update_avatar(&self, email: &str, avatar_url: &str) -> Result<User, AppError>;
}
