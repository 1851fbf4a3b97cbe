// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Fixed-window request counting per caller key.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::metrics::RATE_GATE_THROTTLED;
use crate::SharedClock;

/// Default number of requests allowed per window
pub const DEFAULT_MAX_REQUESTS: u32 = 5;

/// Default window length (1 minute)
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Counter for one caller key
#[derive(Debug, Clone)]
struct Window {
    /// When the window opened (ms since epoch)
    started_ms: i64,
    /// Window length in ms
    length_ms: i64,
    /// Requests seen in this window, rejected ones included
    count: u32,
}

impl Window {
    fn elapsed(&self, now_ms: i64) -> bool {
        now_ms >= self.started_ms.saturating_add(self.length_ms)
    }
}

/// Fixed-window rate gate.
///
/// A key's first request opens a window; every request inside it counts,
/// and only the first `limit` are allowed. Once the window has elapsed the
/// next request opens a fresh one.
#[derive(Clone)]
pub struct RateGate {
    windows: Arc<DashMap<String, Window>>,
    clock: SharedClock,
}

impl RateGate {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Count a request for `key` and report whether it is allowed
    pub fn allow(&self, key: &str, limit: u32, window: Duration) -> bool {
        let now = self.clock.utc().timestamp_millis();
        let length_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);

        let mut entry = self.windows.entry(key.to_string()).or_insert_with(|| Window {
            started_ms: now,
            length_ms,
            count: 0,
        });

        if entry.elapsed(now) {
            entry.started_ms = now;
            entry.length_ms = length_ms;
            entry.count = 0;
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= limit
    }

    /// Like [`RateGate::allow`], failing with [`AppError::Throttled`] when over the limit
    pub fn check(&self, key: &str, limit: u32, window: Duration) -> Result<(), AppError> {
        if self.allow(key, limit, window) {
            Ok(())
        } else {
            metrics::counter!(RATE_GATE_THROTTLED).increment(1);
            Err(AppError::Throttled)
        }
    }

    /// Drop every elapsed window and return how many were removed
    pub fn purge_expired(&self) -> usize {
        purge(&self.windows, self.clock.utc().timestamp_millis())
    }

    /// Number of keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Start a task purging elapsed windows every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let windows = Arc::clone(&self.windows);
        let clock = Arc::clone(&self.clock);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                purge(&windows, clock.utc().timestamp_millis());
            }
        })
    }
}

fn purge(windows: &DashMap<String, Window>, now_ms: i64) -> usize {
    let before = windows.len();
    windows.retain(|_, window| !window.elapsed(now_ms));
    before.saturating_sub(windows.len())
}
