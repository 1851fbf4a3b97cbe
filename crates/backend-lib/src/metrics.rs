// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const IDENTITY_CACHE_HIT: &str = "identity_cache.hit";
pub const IDENTITY_CACHE_MISS: &str = "identity_cache.miss";
pub const IDENTITY_CACHE_INVALIDATED: &str = "identity_cache.invalidated";
pub const IDENTITY_CACHE_EVICTED: &str = "identity_cache.evicted";
pub const RATE_GATE_THROTTLED: &str = "rate_gate.throttled";
pub const TOKEN_ISSUED: &str = "token.issued";
pub const LOGIN_FAILED: &str = "auth.login_failed";
pub const USER_REGISTERED: &str = "auth.user_registered";
