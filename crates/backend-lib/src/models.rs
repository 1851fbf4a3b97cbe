// ============================
// crates/backend-lib/src/models.rs
// ============================
//! Stored records: accounts and contacts.
use std::fmt;

use chrono::NaiveDate;
use contacts_common::{ContactCreate, ContactResponse, ContactUpdate, RecordId, UserResponse};
use serde::{Deserialize, Serialize};

/// Account record as held by the durable store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field("is_verified", &self.is_verified)
            .field("avatar_url", &self.avatar_url)
            .finish()
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_verified: user.is_verified,
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Contact owned by one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: RecordId,
    pub owner_id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub birthday: NaiveDate,
    pub additional_data: Option<String>,
}

impl Contact {
    pub fn new(id: RecordId, owner_id: RecordId, body: ContactCreate) -> Self {
        Self {
            id,
            owner_id,
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone_number: body.phone_number,
            birthday: body.birthday,
            additional_data: body.additional_data,
        }
    }

    /// Overwrite only the fields present in `update`
    pub fn apply(&mut self, update: ContactUpdate) {
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone_number) = update.phone_number {
            self.phone_number = Some(phone_number);
        }
        if let Some(birthday) = update.birthday {
            self.birthday = birthday;
        }
        if let Some(additional_data) = update.additional_data {
            self.additional_data = Some(additional_data);
        }
    }

    /// Case-insensitive substring match on first name, last name or email
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [&self.first_name, &self.last_name, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl From<&Contact> for ContactResponse {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name.clone(),
            last_name: contact.last_name.clone(),
            email: contact.email.clone(),
            phone_number: contact.phone_number.clone(),
            birthday: contact.birthday,
            additional_data: contact.additional_data.clone(),
        }
    }
}
