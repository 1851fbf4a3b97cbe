use std::sync::Arc;

use axum::{extract::State, Json};
use contacts_common::MessageResponse;

use crate::error::AppError;
use crate::storage::Storage;
use crate::AppState;

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the Contacts API v2.0"))
}

/// Liveness probe; fails when the store is unreachable
pub async fn healthz<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<MessageResponse>, AppError> {
    state.storage.health_check().await?;
    Ok(Json(MessageResponse::new("ok")))
}
