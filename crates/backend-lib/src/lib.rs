// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core library for the contacts server: identity and access, contacts
//! storage, and the HTTP surface built on them.

pub mod auth;
pub mod config;
pub mod contacts;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod router;
pub mod storage;
pub mod validation;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tokio::task::JoinHandle;

use crate::auth::{AuthService, CredentialHasher, DefaultAuth, IdentityCache, RateGate, TokenService};
use crate::config::Settings;
use crate::error::AppError;
use crate::mailer::Mailer;
use crate::storage::Storage;

pub use crate::router::create_router;

/// Time source shared by every component that reads the clock
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Account flows
    pub auth: Arc<dyn AuthService>,
    /// Validated settings
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
    /// Fixed-window gate for sensitive routes
    pub rate_gate: Arc<RateGate>,
    /// The cache the auth service reads through
    pub identity_cache: IdentityCache<S>,
    pub clock: SharedClock,
}

impl<S: Storage> AppState<S> {
    /// Create a new application state on the system clock
    pub fn new(storage: S, settings: Settings, mailer: Arc<dyn Mailer>) -> Result<Self, AppError> {
        Self::with_clock(storage, settings, mailer, Arc::new(DefaultClock))
    }

    /// Create a new application state on the given clock
    pub fn with_clock(
        storage: S,
        settings: Settings,
        mailer: Arc<dyn Mailer>,
        clock: SharedClock,
    ) -> Result<Self, AppError> {
        let hasher = CredentialHasher::with_cost(settings.auth.hash_log_n)?;
        let tokens = TokenService::new(
            settings.auth.jwt_secret.expose().as_bytes(),
            settings.auth.session_ttl(),
            Arc::clone(&clock),
        )?;
        let identity_cache =
            IdentityCache::new(storage.clone(), settings.cache.user_ttl(), Arc::clone(&clock));
        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            hasher,
            tokens,
            identity_cache.clone(),
            mailer,
        ));

        Ok(Self {
            auth,
            settings: Arc::new(settings),
            storage,
            rate_gate: Arc::new(RateGate::new(Arc::clone(&clock))),
            identity_cache,
            clock,
        })
    }

    /// Start the cache and rate-gate sweepers at the configured interval
    pub fn spawn_sweepers(&self) -> Sweepers {
        let interval = self.settings.cache.sweep_interval();
        Sweepers {
            handles: vec![
                self.identity_cache.spawn_sweeper(interval),
                self.rate_gate.spawn_sweeper(interval),
            ],
        }
    }
}

/// Owned handles of the background sweep tasks
#[derive(Debug)]
pub struct Sweepers {
    handles: Vec<JoinHandle<()>>,
}

impl Sweepers {
    /// Stop every sweeper
    pub fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}
