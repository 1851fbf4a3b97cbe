// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request body validation.

use crate::auth::password::{validate_password_strength, PasswordRequirements};
use crate::error::AppError;
use contacts_common::{ContactCreate, ContactUpdate, UserCreate};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_PHONE_LENGTH: usize = 20;
const MAX_ADDITIONAL_DATA_LENGTH: usize = 1000;
const MAX_URL_LENGTH: usize = 2048;
const MAX_QUERY_LENGTH: usize = 100;

/// Largest page a contact listing returns
pub const MAX_PAGE_LIMIT: usize = 100;

// Regex patterns for validation
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap_or_else(|e| {
        panic!("email pattern: {e}")
    })
});
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^<>/\\{}()\[\];]*$").unwrap_or_else(|e| panic!("name pattern: {e}"))
});
static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9 ()-]{3,20}$").unwrap_or_else(|e| panic!("phone pattern: {e}"))
});

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Invalid avatar URL: {0}")]
    InvalidUrl(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a registration password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    let requirements = PasswordRequirements::default();
    if !validate_password_strength(password, &requirements) {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {} characters and contain a lowercase letter and a digit",
            requirements.min_length
        )));
    }
    Ok(password)
}

/// Validate a first or last name
pub fn validate_name<'a>(field: &str, name: &'a str) -> ValidationResult<&'a str> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(format!(
            "{field} must not be empty"
        )));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "{field} must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }

    // Check for potentially dangerous characters
    if !NAME_REGEX.is_match(name) {
        return Err(ValidationError::InvalidName(format!(
            "{field} contains invalid characters"
        )));
    }

    Ok(name)
}

/// Validate a phone number
pub fn validate_phone(phone: &str) -> ValidationResult<&str> {
    if phone.len() > MAX_PHONE_LENGTH || !PHONE_REGEX.is_match(phone) {
        return Err(ValidationError::InvalidPhone(
            "Phone number may contain only digits, spaces, dashes, parentheses and a leading +"
                .to_string(),
        ));
    }
    Ok(phone)
}

fn validate_additional_data(data: &str) -> ValidationResult<&str> {
    if data.chars().count() > MAX_ADDITIONAL_DATA_LENGTH {
        return Err(ValidationError::InvalidField(format!(
            "additional_data cannot exceed {MAX_ADDITIONAL_DATA_LENGTH} characters"
        )));
    }
    Ok(data)
}

/// Validate an avatar URL; only http(s) links are accepted
pub fn validate_avatar_url(url: &str) -> ValidationResult<&str> {
    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::InvalidUrl(format!(
            "URL cannot exceed {MAX_URL_LENGTH} characters"
        )));
    }

    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| ValidationError::InvalidUrl("URL must use http or https".to_string()))?;
    if rest.is_empty() || rest.starts_with('/') || rest.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl("URL has no host".to_string()));
    }

    Ok(url)
}

/// Validate a search query
pub fn validate_query(query: &str) -> ValidationResult<&str> {
    if query.trim().is_empty() || query.chars().count() > MAX_QUERY_LENGTH {
        return Err(ValidationError::InvalidField(format!(
            "query must be between 1 and {MAX_QUERY_LENGTH} characters"
        )));
    }
    Ok(query)
}

/// Clamp a requested page size to `1..=MAX_PAGE_LIMIT`
pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

/// Validate a registration request
pub fn validate_user_create(body: &UserCreate) -> ValidationResult<()> {
    validate_email(&body.email)?;
    validate_password(&body.password)?;
    Ok(())
}

/// Validate a new contact
pub fn validate_contact_create(body: &ContactCreate) -> ValidationResult<()> {
    validate_name("first_name", &body.first_name)?;
    validate_name("last_name", &body.last_name)?;
    validate_email(&body.email)?;
    if let Some(phone) = &body.phone_number {
        validate_phone(phone)?;
    }
    if let Some(data) = &body.additional_data {
        validate_additional_data(data)?;
    }
    Ok(())
}

/// Validate the fields present in a partial update
pub fn validate_contact_update(body: &ContactUpdate) -> ValidationResult<()> {
    if let Some(first_name) = &body.first_name {
        validate_name("first_name", first_name)?;
    }
    if let Some(last_name) = &body.last_name {
        validate_name("last_name", last_name)?;
    }
    if let Some(email) = &body.email {
        validate_email(email)?;
    }
    if let Some(phone) = &body.phone_number {
        validate_phone(phone)?;
    }
    if let Some(data) = &body.additional_data {
        validate_additional_data(data)?;
    }
    Ok(())
}
