//! In-process `UserRepository` used by tests and local runs without a
//! database.
//!
//! Mirrors the MongoDB adapter's observable behaviour: ObjectId-shaped
//! identifiers, insertion order, and a unique email constraint that
//! surfaces as [`UserPersistenceError::DuplicateKey`].

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use mongodb::bson::oid::ObjectId;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUserRecord, User, UserChanges, UserId};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

/// Mutex-guarded user list.
pub struct MemoryUserRepository {
    users: Mutex<Vec<StoredUser>>,
    clock: Arc<dyn Clock>,
}

impl MemoryUserRepository {
    /// Empty repository; `clock` stamps `created_at`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredUser>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }

    /// Stored hash for `id`, or `None` when absent.
    pub fn password_hash(&self, id: &UserId) -> Option<String> {
        self.lock()
            .ok()?
            .iter()
            .find(|stored| &stored.user.id == id)
            .map(|stored| stored.password_hash.clone())
    }
}

fn email_taken(users: &[StoredUser], email: &str, except: Option<&UserId>) -> bool {
    users
        .iter()
        .any(|stored| stored.user.email == email && Some(&stored.user.id) != except)
}

fn duplicate_email(email: &str) -> UserPersistenceError {
    UserPersistenceError::duplicate_key(format!("email {email} already stored"))
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let id = UserId::new(ObjectId::new().to_hex())
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let user = User {
            id,
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role,
            created_at: self.clock.utc(),
        };

        let mut users = self.lock()?;
        if email_taken(&users, &record.email, None) {
            return Err(duplicate_email(&record.email));
        }
        users.push(StoredUser {
            user: user.clone(),
            password_hash: record.password_hash.clone(),
        });
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .iter()
            .find(|stored| &stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut users = self.lock()?;
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(duplicate_email(email));
            }
        }
        let Some(stored) = users.iter_mut().find(|stored| &stored.user.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            stored.user.name.clone_from(name);
        }
        if let Some(email) = &changes.email {
            stored.user.email.clone_from(email);
        }
        if let Some(password_hash) = &changes.password_hash {
            stored.password_hash.clone_from(password_hash);
        }
        if let Some(role) = changes.role {
            stored.user.role = role;
        }
        Ok(Some(stored.user.clone()))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut users = self.lock()?;
        let before = users.len();
        users.retain(|stored| &stored.user.id != id);
        Ok(users.len() != before)
    }
}
