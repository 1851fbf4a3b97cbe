// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers.
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::models::User;
use crate::storage::Storage;
use crate::AppState;

pub mod contacts;
pub mod health;
pub mod users;

/// Account resolved from an `Authorization: Bearer <session token>` header
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S: Storage> FromRequestParts<Arc<AppState<S>>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::MissingCredentials)?;
        let user = state.auth.current_user(token).await?;
        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
