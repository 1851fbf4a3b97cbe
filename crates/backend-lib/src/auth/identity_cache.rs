// ============================
// crates/backend-lib/src/auth/identity_cache.rs
// ============================
//! Read-through cache of account records keyed by email.
//!
//! Entries are snapshots with an absolute expiry. A live entry is served
//! without touching the store; an expired or missing one is reloaded. Only
//! found accounts are cached. Concurrent misses for the same key may both
//! read the store and write equivalent entries.
//!
//! Every invalidation bumps a generation counter. A miss only caches what
//! it read if no invalidation happened since the read began, so a load that
//! raced a write cannot outlive that write's invalidation.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::metrics::{
    IDENTITY_CACHE_EVICTED, IDENTITY_CACHE_HIT, IDENTITY_CACHE_INVALIDATED, IDENTITY_CACHE_MISS,
};
use crate::models::User;
use crate::storage::UserStore;
use crate::SharedClock;

/// Default entry lifetime (15 minutes)
pub const DEFAULT_USER_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    user: User,
    expires_at_ms: i64,
}

/// TTL cache in front of a [`UserStore`]
#[derive(Clone)]
pub struct IdentityCache<S> {
    entries: Arc<DashMap<String, CacheEntry>>,
    generation: Arc<AtomicU64>,
    store: S,
    ttl_ms: i64,
    clock: SharedClock,
}

impl<S: UserStore> IdentityCache<S> {
    pub fn new(store: S, ttl: Duration, clock: SharedClock) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
            store,
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Resolve an email to its account, loading from the store on a miss.
    ///
    /// Returns `Ok(None)` when the store has no such account.
    pub async fn resolve(&self, email: &str) -> Result<Option<User>, AppError> {
        let now = self.now_ms();

        // The read guard must be gone before any write to the same shard
        let cached = self.entries.get(email).map(|entry| entry.value().clone());
        match cached {
            Some(entry) if now < entry.expires_at_ms => {
                metrics::counter!(IDENTITY_CACHE_HIT).increment(1);
                return Ok(Some(entry.user));
            },
            Some(_) => {
                self.entries
                    .remove_if(email, |_, entry| entry.expires_at_ms <= now);
            },
            None => {},
        }

        metrics::counter!(IDENTITY_CACHE_MISS).increment(1);
        let generation = self.generation.load(Ordering::SeqCst);
        let Some(user) = self.store.find_user_by_email(email).await? else {
            return Ok(None);
        };

        // Checked under the shard lock that `invalidate` needs for its removal
        let slot = self.entries.entry(email.to_string());
        if self.generation.load(Ordering::SeqCst) == generation {
            slot.insert(CacheEntry {
                user: user.clone(),
                expires_at_ms: self.now_ms().saturating_add(self.ttl_ms),
            });
        }
        Ok(Some(user))
    }

    /// Drop the entry for `email`; the next resolve reads the store
    pub fn invalidate(&self, email: &str) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.entries.remove(email).is_some() {
            metrics::counter!(IDENTITY_CACHE_INVALIDATED).increment(1);
        }
    }

    /// Remove every expired entry and return how many were dropped
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries, self.now_ms())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a task purging expired entries every `interval`.
    ///
    /// The caller owns the handle and aborts it at shutdown.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let entries = Arc::clone(&self.entries);
        let clock = Arc::clone(&self.clock);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                purge(&entries, clock.utc().timestamp_millis());
            }
        })
    }

    fn now_ms(&self) -> i64 {
        self.clock.utc().timestamp_millis()
    }
}

fn purge(entries: &DashMap<String, CacheEntry>, now_ms: i64) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| now_ms < entry.expires_at_ms);
    let evicted = before.saturating_sub(entries.len());
    if evicted > 0 {
        metrics::counter!(IDENTITY_CACHE_EVICTED).increment(evicted as u64);
    }
    evicted
}
