// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Identity and access: hashing, tokens, identity cache and rate gate.

pub mod identity_cache;
pub mod password;
pub mod rate_limit;
pub mod token;
mod service;
mod service_impl;

pub use identity_cache::IdentityCache;
pub use password::{
    hash_password, validate_password_strength, verify_password, CredentialHasher,
    PasswordRequirements, MIN_PASSWORD_LENGTH,
};
pub use rate_limit::RateGate;
pub use service::{AuthService, EmailConfirmation};
pub use service_impl::DefaultAuth;
pub use token::{Claims, TokenScope, TokenService};
