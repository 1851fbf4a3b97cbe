// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use contacts_common::{ContactCreate, ContactUpdate, RecordId};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs as tokio_fs, sync::Mutex};
use tracing::debug;

use crate::error::AppError;
use crate::models::{Contact, User};

const USERS_FILE: &str = "users.json";
const CONTACTS_FILE: &str = "contacts.json";

/// Durable account records, keyed by email
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find an account by its exact (case-sensitive) email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Create an unverified account; fails with `AlreadyRegistered` on a taken email
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    /// Overwrite an existing account, matched by id
    async fn save_user(&self, user: &User) -> Result<(), AppError>;

    /// Set the verification flag in one step.
    ///
    /// Returns `false` when the account was already verified; the flag is
    /// never cleared.
    async fn mark_verified(&self, email: &str) -> Result<bool, AppError>;

    /// Replace the avatar URL in one step and return the updated account
    async fn set_avatar(&self, email: &str, avatar_url: &str) -> Result<User, AppError>;
}

/// Durable contact records, always scoped to their owner
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn create_contact(&self, owner_id: RecordId, body: ContactCreate)
        -> Result<Contact, AppError>;

    /// Contacts in id order, paginated
    async fn list_contacts(
        &self,
        owner_id: RecordId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Contact>, AppError>;

    async fn get_contact(&self, owner_id: RecordId, id: RecordId)
        -> Result<Option<Contact>, AppError>;

    async fn update_contact(
        &self,
        owner_id: RecordId,
        id: RecordId,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, AppError>;

    /// Remove a contact and return it, if it existed
    async fn delete_contact(
        &self,
        owner_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, AppError>;

    async fn search_contacts(&self, owner_id: RecordId, query: &str)
        -> Result<Vec<Contact>, AppError>;

    /// Every contact of the owner; input for the birthday window
    async fn contacts_for_owner(&self, owner_id: RecordId) -> Result<Vec<Contact>, AppError>;
}

/// Everything the HTTP layer needs from a storage backend
#[async_trait]
pub trait Storage: UserStore + ContactStore + Clone + 'static {
    /// Cheap liveness probe
    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
struct StoreState {
    users: Vec<User>,
    contacts: Vec<Contact>,
    next_user_id: RecordId,
    next_contact_id: RecordId,
}

/// JSON-file implementation of the storage traits.
///
/// All records live in memory behind one async mutex; every mutation is
/// written to a temporary file and renamed over the previous one before it
/// becomes visible, so readers always see what is on disk.
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    state: Arc<Mutex<StoreState>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, AppError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let users: Vec<User> = load_records(&root.join(USERS_FILE))?;
        let contacts: Vec<Contact> = load_records(&root.join(CONTACTS_FILE))?;
        let next_user_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let next_contact_id = contacts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        debug!(
            root = %root.display(),
            users = users.len(),
            contacts = contacts.len(),
            "flat-file store loaded"
        );

        Ok(Self {
            root,
            state: Arc::new(Mutex::new(StoreState {
                users,
                contacts,
                next_user_id,
                next_contact_id,
            })),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read, change and persist one account while holding the state lock.
    ///
    /// `change` returns whether it modified the record; untouched records
    /// are not rewritten.
    async fn modify_user<F>(&self, email: &str, change: F) -> Result<(User, bool), AppError>
    where
        F: FnOnce(&mut User) -> bool + Send,
    {
        let mut state = self.state.lock().await;
        let Some(index) = state.users.iter().position(|u| u.email == email) else {
            return Err(AppError::NotFound("user".to_string()));
        };

        let mut user = state.users[index].clone();
        if !change(&mut user) {
            return Ok((user, false));
        }

        let mut users = state.users.clone();
        users[index] = user.clone();
        self.persist(USERS_FILE, &users).await?;

        state.users = users;
        Ok((user, true))
    }

    async fn persist<T: Serialize>(&self, file: &str, records: &[T]) -> Result<(), AppError> {
        let path = self.root.join(file);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(records)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

#[async_trait]
impl UserStore for FlatFileStorage {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == email) {
            return Err(AppError::AlreadyRegistered);
        }

        let user = User {
            id: state.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_verified: false,
            avatar_url: None,
        };
        let mut users = state.users.clone();
        users.push(user.clone());
        self.persist(USERS_FILE, &users).await?;

        state.users = users;
        state.next_user_id += 1;
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let Some(index) = state.users.iter().position(|u| u.id == user.id) else {
            return Err(AppError::NotFound(format!("user {}", user.id)));
        };

        let mut users = state.users.clone();
        users[index] = user.clone();
        self.persist(USERS_FILE, &users).await?;

        state.users = users;
        Ok(())
    }

    async fn mark_verified(&self, email: &str) -> Result<bool, AppError> {
        let (_, changed) = self
            .modify_user(email, |user| !std::mem::replace(&mut user.is_verified, true))
            .await?;
        Ok(changed)
    }

    async fn set_avatar(&self, email: &str, avatar_url: &str) -> Result<User, AppError> {
        let (user, _) = self
            .modify_user(email, |user| {
                user.avatar_url = Some(avatar_url.to_string());
                true
            })
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl ContactStore for FlatFileStorage {
    async fn create_contact(
        &self,
        owner_id: RecordId,
        body: ContactCreate,
    ) -> Result<Contact, AppError> {
        let mut state = self.state.lock().await;
        let contact = Contact::new(state.next_contact_id, owner_id, body);

        let mut contacts = state.contacts.clone();
        contacts.push(contact.clone());
        self.persist(CONTACTS_FILE, &contacts).await?;

        state.contacts = contacts;
        state.next_contact_id += 1;
        Ok(contact)
    }

    async fn list_contacts(
        &self,
        owner_id: RecordId,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Contact>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .contacts
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_contact(
        &self,
        owner_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .contacts
            .iter()
            .find(|c| c.id == id && c.owner_id == owner_id)
            .cloned())
    }

    async fn update_contact(
        &self,
        owner_id: RecordId,
        id: RecordId,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, AppError> {
        let mut state = self.state.lock().await;
        let Some(index) = state
            .contacts
            .iter()
            .position(|c| c.id == id && c.owner_id == owner_id)
        else {
            return Ok(None);
        };

        let mut contacts = state.contacts.clone();
        contacts[index].apply(update);
        let updated = contacts[index].clone();
        self.persist(CONTACTS_FILE, &contacts).await?;

        state.contacts = contacts;
        Ok(Some(updated))
    }

    async fn delete_contact(
        &self,
        owner_id: RecordId,
        id: RecordId,
    ) -> Result<Option<Contact>, AppError> {
        let mut state = self.state.lock().await;
        let Some(index) = state
            .contacts
            .iter()
            .position(|c| c.id == id && c.owner_id == owner_id)
        else {
            return Ok(None);
        };

        let mut contacts = state.contacts.clone();
        let removed = contacts.remove(index);
        self.persist(CONTACTS_FILE, &contacts).await?;

        state.contacts = contacts;
        Ok(Some(removed))
    }

    async fn search_contacts(
        &self,
        owner_id: RecordId,
        query: &str,
    ) -> Result<Vec<Contact>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .contacts
            .iter()
            .filter(|c| c.owner_id == owner_id && c.matches_query(query))
            .cloned()
            .collect())
    }

    async fn contacts_for_owner(&self, owner_id: RecordId) -> Result<Vec<Contact>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .contacts
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn health_check(&self) -> Result<(), AppError> {
        let metadata = tokio_fs::metadata(&self.root).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "{} is not a directory",
                self.root.display()
            )))
        }
    }
}
