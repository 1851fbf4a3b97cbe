// ============================
// crates/backend-lib/src/handlers/contacts.rs
// ============================
//! Contact routes under `/contacts`, scoped to the signed-in account.
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use contacts_common::{BirthdayResponse, ContactCreate, ContactResponse, ContactUpdate, RecordId};
use serde::Deserialize;
use tracing::debug;

use super::CurrentUser;
use crate::contacts::{birthday_notice, upcoming_birthdays, DEFAULT_WINDOW_DAYS};
use crate::error::AppError;
use crate::storage::Storage;
use crate::validation::{
    clamp_limit, validate_contact_create, validate_contact_update, validate_query,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct BirthdayQuery {
    #[serde(default = "default_days")]
    pub days: i64,
    pub start_date: Option<NaiveDate>,
}

fn default_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

fn not_found(id: RecordId) -> AppError {
    AppError::NotFound(format!("contact {id}"))
}

pub async fn create<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<ContactCreate>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    validate_contact_create(&body)?;
    let contact = state.storage.create_contact(user.id, body).await?;
    debug!(owner = user.id, contact = contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(ContactResponse::from(&contact))))
}

pub async fn list<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let contacts = state
        .storage
        .list_contacts(user.id, page.skip, clamp_limit(page.limit))
        .await?;
    Ok(Json(contacts.iter().map(ContactResponse::from).collect()))
}

pub async fn get<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<RecordId>,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = state
        .storage
        .get_contact(user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ContactResponse::from(&contact)))
}

pub async fn update<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<RecordId>,
    Json(body): Json<ContactUpdate>,
) -> Result<Json<ContactResponse>, AppError> {
    validate_contact_update(&body)?;
    let contact = state
        .storage
        .update_contact(user.id, id, body)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ContactResponse::from(&contact)))
}

pub async fn delete<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, AppError> {
    state
        .storage
        .delete_contact(user.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    debug!(owner = user.id, contact = id, "contact deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn search<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    validate_query(&query.query)?;
    let contacts = state.storage.search_contacts(user.id, &query.query).await?;
    Ok(Json(contacts.iter().map(ContactResponse::from).collect()))
}

/// Contacts with a birthday in the next `days` days (default 7) from
/// `start_date` (default today, UTC). Windows longer than a month are
/// approximate.
pub async fn birthdays<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BirthdayQuery>,
) -> Result<Json<Vec<BirthdayResponse>>, AppError> {
    let anchor = query
        .start_date
        .unwrap_or_else(|| state.clock.utc().date_naive());
    let contacts = state.storage.contacts_for_owner(user.id).await?;
    let upcoming = upcoming_birthdays(&contacts, anchor, query.days)?;
    Ok(Json(upcoming.into_iter().map(birthday_notice).collect()))
}
