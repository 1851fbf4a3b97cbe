// ================
// crates/common/src/lib.rs
// ================
//! Common request and response bodies
//! shared between the contacts server and its clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric identifier assigned by the durable store
pub type RecordId = u64;

/// Registration request
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
}

/// Login form. `username` carries the account email.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Public view of an account; the password hash never leaves the server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    pub id: RecordId,
    pub email: String,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
}

/// Bearer token returned by a successful login
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Ask for a fresh verification email
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RequestEmail {
    pub email: String,
}

/// Point the account avatar at an already-hosted image
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AvatarUpdate {
    pub avatar_url: String,
}

/// Plain acknowledgement body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// New contact
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContactCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub birthday: NaiveDate,
    #[serde(default)]
    pub additional_data: Option<String>,
}

/// Partial contact update; absent fields are left untouched
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ContactUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub additional_data: Option<String>,
}

/// Stored contact as returned to its owner
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContactResponse {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub birthday: NaiveDate,
    pub additional_data: Option<String>,
}

/// One line of the upcoming-birthdays listing
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BirthdayResponse {
    pub message: String,
}
