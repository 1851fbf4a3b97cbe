use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::storage::Storage;
use crate::{error::AppError, AppState};

/// Rate gate middleware.
///
/// Requests are counted per route and client address with the configured
/// window; the first `max_requests` in a window pass.
pub async fn rate_limit<S: Storage>(
    State(state): State<Arc<AppState<S>>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let limits = &state.settings.rate_limit;
    let client = client_address(&request, limits.trust_proxy_headers);
    let key = format!("{}|{client}", request.uri().path());

    if let Err(e) = state
        .rate_gate
        .check(&key, limits.max_requests, limits.window())
    {
        warn!(%client, path = %request.uri().path(), "request throttled");
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Client address used in rate keys.
///
/// Proxy headers are only consulted when `trust_proxy_headers` is set;
/// otherwise the connection's peer address counts. Falls back to `unknown`.
pub fn client_address<B>(request: &Request<B>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = forwarded_address(request.headers()) {
            return ip;
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// `x-real-ip`, else the first `x-forwarded-for` hop
pub fn forwarded_address(headers: &HeaderMap) -> Option<String> {
    if let Some(ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
        return Some(ip.trim().to_string());
    }
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|list| list.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}
