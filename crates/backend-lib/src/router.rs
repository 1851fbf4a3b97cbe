// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP route table.
use crate::handlers::{contacts, health, users};
use crate::middleware::rate_limit;
use crate::storage::Storage;
use crate::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// `/users/login` and `/users/me` sit behind the rate gate.
pub fn create_router<S: Storage>(state: Arc<AppState<S>>) -> Router {
    let gated = Router::new()
        .route("/users/login", post(users::login::<S>))
        .route("/users/me", get(users::me))
        .route_layer(from_fn_with_state(state.clone(), rate_limit::<S>));

    Router::new()
        .route("/", get(health::root))
        .route("/healthz", get(health::healthz::<S>))
        .route("/users/register", post(users::register::<S>))
        .route("/users/verify", get(users::verify_email::<S>))
        .route("/users/request_email", post(users::request_email::<S>))
        .route("/users/me/avatar", post(users::update_avatar::<S>))
        .route(
            "/contacts",
            get(contacts::list::<S>).post(contacts::create::<S>),
        )
        .route("/contacts/search", get(contacts::search::<S>))
        .route("/contacts/birthdays", get(contacts::birthdays::<S>))
        .route(
            "/contacts/{id}",
            get(contacts::get::<S>)
                .put(contacts::update::<S>)
                .delete(contacts::delete::<S>),
        )
        .merge(gated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
