use std::sync::Arc;

use async_trait::async_trait;
use contacts_common::UserCreate;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use crate::auth::identity_cache::IdentityCache;
use crate::auth::password::CredentialHasher;
use crate::auth::service::{AuthService, EmailConfirmation};
use crate::auth::token::{TokenScope, TokenService};
use crate::error::AppError;
use crate::mailer::Mailer;
use crate::metrics::{LOGIN_FAILED, TOKEN_ISSUED, USER_REGISTERED};
use crate::models::User;
use crate::storage::UserStore;
use crate::validation::{validate_avatar_url, validate_user_create};

/// Plaintext behind the digest checked for unknown emails at login
const DUMMY_PASSWORD: &str = "no-such-account";

/// Account flows over a [`UserStore`].
///
/// Writes go to the store first as single-field updates; the cached entry
/// for the same email is then invalidated so the next resolve reloads it.
pub struct DefaultAuth<S> {
    store: S,
    hasher: CredentialHasher,
    tokens: TokenService,
    cache: IdentityCache<S>,
    mailer: Arc<dyn Mailer>,
    dummy_digest: OnceCell<String>,
}

impl<S: UserStore + Clone + 'static> DefaultAuth<S> {
    pub fn new(
        store: S,
        hasher: CredentialHasher,
        tokens: TokenService,
        cache: IdentityCache<S>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            cache,
            mailer,
            dummy_digest: OnceCell::new(),
        }
    }

    async fn send_verification(&self, email: &str) -> Result<(), AppError> {
        let token = self.tokens.issue(email, TokenScope::EmailVerify)?;
        metrics::counter!(TOKEN_ISSUED, "scope" => "email_verify").increment(1);
        self.mailer.send_verification(email, &token).await
    }

    async fn hash(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
    }

    async fn verify(&self, hash: String, password: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))
    }

    /// Spend the same scrypt work as a real check for an email with no account
    async fn verify_unknown(&self, password: &str) -> Result<(), AppError> {
        let digest = self
            .dummy_digest
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD.to_string()))
            .await?
            .clone();
        self.verify(digest, password.to_string()).await?;
        Ok(())
    }
}

#[async_trait]
impl<S: UserStore + Clone + 'static> AuthService for DefaultAuth<S> {
    #[instrument(skip_all, fields(email = %body.email))]
    async fn register(&self, body: UserCreate) -> Result<User, AppError> {
        validate_user_create(&body)?;
        if self.store.find_user_by_email(&body.email).await?.is_some() {
            return Err(AppError::AlreadyRegistered);
        }

        let password_hash = self.hash(body.password).await?;
        let user = self.store.create_user(&body.email, &password_hash).await?;
        metrics::counter!(USER_REGISTERED).increment(1);
        info!(user_id = user.id, "user registered");

        // The account exists either way; a new link can be requested later
        if let Err(e) = self.send_verification(&user.email).await {
            warn!(error = %e, "verification email not sent");
        }
        Ok(user)
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            self.verify_unknown(password).await?;
            metrics::counter!(LOGIN_FAILED).increment(1);
            info!("login for unknown email");
            return Err(AppError::InvalidCredential);
        };

        if !self.verify(user.password_hash.clone(), password.to_string()).await? {
            metrics::counter!(LOGIN_FAILED).increment(1);
            info!(user_id = user.id, "login with wrong password");
            return Err(AppError::InvalidCredential);
        }

        let token = self.tokens.issue(&user.email, TokenScope::Session)?;
        metrics::counter!(TOKEN_ISSUED, "scope" => "session").increment(1);
        info!(user_id = user.id, "session issued");
        Ok(token)
    }

    async fn current_user(&self, session_token: &str) -> Result<User, AppError> {
        let email = self.tokens.verify(session_token, TokenScope::Session)?;
        self.cache
            .resolve(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    #[instrument(skip_all)]
    async fn confirm_email(&self, token: &str) -> Result<EmailConfirmation, AppError> {
        let email = self.tokens.verify(token, TokenScope::EmailVerify)?;
        if !self.store.mark_verified(&email).await? {
            return Ok(EmailConfirmation::AlreadyVerified);
        }

        self.cache.invalidate(&email);
        info!("email verified");
        Ok(EmailConfirmation::Verified)
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn request_verification(&self, email: &str) -> Result<(), AppError> {
        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Err(AppError::NotFound("user".to_string()));
        };
        if user.is_verified {
            return Err(AppError::AlreadyVerified);
        }
        self.send_verification(&user.email).await
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn update_avatar(&self, email: &str, avatar_url: &str) -> Result<User, AppError> {
        validate_avatar_url(avatar_url)?;
        let user = self.store.set_avatar(email, avatar_url).await?;
        self.cache.invalidate(email);
        info!(user_id = user.id, "avatar updated");
        Ok(user)
    }
}
