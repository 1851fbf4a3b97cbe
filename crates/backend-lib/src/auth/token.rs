// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Scope-tagged HS256 tokens for sessions and email verification.
//!
//! Both scopes share one signing secret; the `scope` claim is covered by the
//! signature and is the only thing separating a session token from a
//! verification token.
use std::fmt;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{AppError, TokenError};
use crate::SharedClock;

type HmacSha256 = Hmac<Sha256>;

/// Verification links stay valid for one hour
pub const VERIFICATION_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// What a token may authorize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    Session,
    EmailVerify,
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenScope::Session => f.write_str("session"),
            TokenScope::EmailVerify => f.write_str("email_verify"),
        }
    }
}

/// The complete claim set; anything else in a payload is refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub sub: String,
    pub scope: TokenScope,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Issues and verifies signed tokens
#[derive(Clone)]
pub struct TokenService {
    secret: Zeroizing<Vec<u8>>,
    session_ttl: Duration,
    clock: SharedClock,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service; an empty secret is refused
    pub fn new(secret: &[u8], session_ttl: Duration, clock: SharedClock) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::InvalidInput("token secret must not be empty".to_string()));
        }
        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            session_ttl,
            clock,
        })
    }

    /// Lifetime of tokens of the given scope
    pub fn lifetime(&self, scope: TokenScope) -> Duration {
        match scope {
            TokenScope::Session => self.session_ttl,
            TokenScope::EmailVerify => VERIFICATION_TOKEN_TTL,
        }
    }

    /// Issue a token for `subject` valid for the scope's lifetime from now
    pub fn issue(&self, subject: &str, scope: TokenScope) -> Result<String, AppError> {
        let now = self.clock.utc().timestamp();
        let lifetime = i64::try_from(self.lifetime(scope).as_secs())
            .map_err(|_| AppError::Internal("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: subject.to_string(),
            scope,
            iat: now,
            exp: now.saturating_add(lifetime),
        };
        self.encode(&claims)
    }

    /// Verify a token for `required_scope` and return its subject.
    ///
    /// Checks run in order: structure, signature, claims, expiry, scope.
    pub fn verify(&self, token: &str, required_scope: TokenScope) -> Result<String, TokenError> {
        let claims = self.decode(token)?;

        if self.clock.utc().timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.scope != required_scope {
            return Err(TokenError::ScopeMismatch);
        }
        Ok(claims.sub)
    }

    fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        };
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.trim().split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_raw = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenError::Malformed)?;
        let header: Header =
            serde_json::from_slice(&header_raw).map_err(|_| TokenError::Malformed)?;
        if header.alg != ALGORITHM || !header.typ.eq_ignore_ascii_case(TOKEN_TYPE) {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac().map_err(|_| TokenError::InvalidSignature)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        // constant-time comparison
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims_raw = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| TokenError::Malformed)?;
        serde_json::from_slice(&claims_raw).map_err(|_| TokenError::Malformed)
    }

    fn mac(&self) -> Result<HmacSha256, AppError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(format!("invalid HMAC key: {e}")))
    }
}
