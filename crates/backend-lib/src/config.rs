// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::auth::identity_cache::DEFAULT_USER_TTL;
use crate::auth::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};
use crate::error::AppError;

/// Shortest accepted HMAC signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted session lifetime (7 days)
pub const MAX_SESSION_TTL_MINUTES: u64 = 7 * 24 * 60;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Secret value that never shows up in logs and is wiped on drop
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub cache: CacheSettings,
    pub rate_limit: RateLimitSettings,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Public base URL used to build verification links
    pub base_url: String,
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Durable store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub path: PathBuf,
}

/// Token signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Shared HMAC secret for every token scope
    pub jwt_secret: Secret,
    /// Lifetime of session tokens
    pub session_ttl_minutes: u64,
    /// scrypt cost as log2(N)
    pub hash_log_n: u8,
}

/// Identity cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub user_ttl_secs: u64,
    /// How often expired cache entries and rate windows are swept
    pub sweep_interval_secs: u64,
}

/// Rate gate settings for the protected endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_requests: u32,
    /// Key clients on `x-real-ip` / `x-forwarded-for`. Only safe behind a
    /// proxy that overwrites those headers; otherwise the peer address is used.
    pub trust_proxy_headers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            cache: CacheSettings::default(),
            rate_limit: RateLimitSettings::default(),
            log_level: "info".to_string(),
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data"),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: Secret::default(),
            session_ttl_minutes: 15,
            hash_log_n: 17,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            user_ttl_secs: DEFAULT_USER_TTL.as_secs(),
            sweep_interval_secs: 60,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW.as_secs(),
            max_requests: DEFAULT_MAX_REQUESTS,
            trust_proxy_headers: false,
        }
    }
}

impl AuthSettings {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes.saturating_mul(60))
    }
}

impl CacheSettings {
    pub fn user_ttl(&self) -> Duration {
        Duration::from_secs(self.user_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Settings {
    /// Load settings from `config.toml` in the working directory and the environment
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config.toml")
    }

    /// Load settings from defaults, then `path` (if present), then `CONTACTS_*` env vars.
    ///
    /// Nested keys use a double underscore, e.g. `CONTACTS_AUTH__JWT_SECRET`.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("CONTACTS_").split("__"))
            .extract()
            .map_err(|e| AppError::InvalidInput(format!("configuration: {e}")))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if !VALID_LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::InvalidInput(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.auth.jwt_secret.expose().len() < MIN_SECRET_LENGTH {
            return Err(AppError::InvalidInput(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.auth.session_ttl_minutes) {
            return Err(AppError::InvalidInput(format!(
                "auth.session_ttl_minutes must be between 1 and {MAX_SESSION_TTL_MINUTES}"
            )));
        }
        if !(10..=20).contains(&self.auth.hash_log_n) {
            return Err(AppError::InvalidInput(
                "auth.hash_log_n must be between 10 and 20".to_string(),
            ));
        }
        if self.cache.user_ttl_secs == 0 || self.cache.sweep_interval_secs == 0 {
            return Err(AppError::InvalidInput(
                "cache durations must be positive".to_string(),
            ));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(AppError::InvalidInput(
                "rate_limit values must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
