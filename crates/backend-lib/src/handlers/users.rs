// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! Account routes under `/users`.
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Form, Json,
};
use contacts_common::{
    AvatarUpdate, LoginForm, MessageResponse, RequestEmail, TokenResponse, UserCreate,
    UserResponse,
};
use serde::Deserialize;

use super::CurrentUser;
use crate::auth::EmailConfirmation;
use crate::error::AppError;
use crate::storage::Storage;
use crate::validation::validate_email;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

pub async fn register<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.auth.register(body).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

pub async fn login<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.auth.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn verify_email<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let message = match state.auth.confirm_email(&query.token).await? {
        EmailConfirmation::Verified => "Email verified successfully",
        EmailConfirmation::AlreadyVerified => "Email already verified",
    };
    Ok(Json(MessageResponse::new(message)))
}

pub async fn request_email<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<RequestEmail>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_email(&body.email)?;
    state.auth.request_verification(&body.email).await?;
    Ok(Json(MessageResponse::new("Verification email sent successfully")))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

pub async fn update_avatar<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AvatarUpdate>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.auth.update_avatar(&user.email, &body.avatar_url).await?;
    Ok(Json(UserResponse::from(&user)))
}
