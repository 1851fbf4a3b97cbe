// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use zeroize::Zeroize;

use crate::error::AppError;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted for hashing
pub const MAX_PASSWORD_LENGTH: usize = 128;

const SCRYPT_ALG: &str = "scrypt";

/// Password complexity requirements
#[derive(Debug, Clone)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: false,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
        }
    }
}

/// Salted one-way password hashing with scrypt.
///
/// Digests are PHC strings (`$scrypt$ln=..,r=..,p=..$salt$hash`) carrying their
/// own cost parameters, so a digest made at one cost still verifies after the
/// configured cost changes.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::recommended(),
        }
    }
}

impl CredentialHasher {
    /// Hasher with a custom CPU/memory cost (`log2(N)`); `r = 8`, `p = 1`.
    pub fn with_cost(log_n: u8) -> Result<Self, AppError> {
        let params = Params::new(log_n, 8, 1, Params::RECOMMENDED_LEN)
            .map_err(|e| AppError::InvalidInput(format!("scrypt parameters: {e}")))?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params, &salt)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?
            .to_string();
        Ok(hash)
    }

    /// Verify a password against a digest from [`CredentialHasher::hash`].
    ///
    /// The digest comparison is constant-time. Anything that is not an
    /// scrypt PHC string is rejected.
    pub fn verify(&self, hash: &str, plain: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        if parsed_hash.algorithm.as_str() != SCRYPT_ALG {
            return false;
        }
        Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
    }
}

/// Hash a password using scrypt at the recommended cost
pub fn hash_password(plain: &str) -> Result<String, AppError> {
    CredentialHasher::default().hash(plain)
}

/// Verify a password against any scrypt digest
pub fn verify_password(hash: &str, plain: &str) -> bool {
    CredentialHasher::default().verify(hash, plain)
}

/// Check if a password meets the complexity requirements
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> bool {
    if password.len() < requirements.min_length || password.len() > MAX_PASSWORD_LENGTH {
        return false;
    }

    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        return false;
    }

    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        return false;
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        return false;
    }

    true
}

/// Hash a password and zeroize the caller's copy
pub fn hash_password_secure(hasher: &CredentialHasher, plain: &mut String) -> Result<String, AppError> {
    let hash = hasher.hash(plain);
    plain.zeroize();
    hash
}
