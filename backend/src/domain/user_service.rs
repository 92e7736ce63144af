//! User use-cases over the persistence and hashing ports.
//!
//! This is the only layer that classifies repository failures: duplicate
//! keys on create become conflicts, absent records become not-found, and
//! everything else collapses into a generic server error whose message
//! names the operation. The underlying cause is logged at debug level and
//! never reaches the client.

use std::sync::Arc;

use tracing::debug;

use crate::domain::Error;
use crate::domain::ports::{PasswordHasher, UserPersistenceError, UserRepository};
use crate::domain::{NewUserRecord, User, UserChanges, UserDraft, UserId, UserPatch};

const USER_RESOURCE: &str = "User";
const USER_EMAIL_RESOURCE: &str = "User with this email";

/// Operation-scoped failure messages.
mod messages {
    pub const CREATE: &str = "Unable to create user";
    pub const FIND_ALL: &str = "Unable to find users";
    pub const FIND_ONE: &str = "Unable to find user";
    pub const UPDATE: &str = "Unable to update user";
    pub const DELETE: &str = "Unable to delete user";
}

fn storage_failure(operation: &'static str) -> impl FnOnce(UserPersistenceError) -> Error {
    move |error| {
        debug!(%error, operation, "user repository call failed");
        Error::server(operation)
    }
}

/// Create, read, update and delete users.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Build the service from its driven ports.
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    async fn hash(&self, password: &str, operation: &'static str) -> Result<String, Error> {
        self.hasher.hash(password).await.map_err(|error| {
            debug!(%error, operation, "password hashing failed");
            Error::server(operation)
        })
    }

    /// Hash the draft's password and persist it.
    ///
    /// A duplicate email is reported as a conflict.
    pub async fn create(&self, draft: UserDraft) -> Result<User, Error> {
        let password_hash = self.hash(draft.password.as_str(), messages::CREATE).await?;
        let record = NewUserRecord {
            name: draft.name,
            email: draft.email,
            password_hash,
            role: draft.role,
        };
        match self.repository.insert(&record).await {
            Ok(user) => Ok(user),
            Err(UserPersistenceError::DuplicateKey { message }) => {
                debug!(%message, "email already registered");
                Err(Error::conflict(USER_EMAIL_RESOURCE))
            }
            Err(error) => Err(storage_failure(messages::CREATE)(error)),
        }
    }

    /// Every stored user.
    pub async fn find_all(&self) -> Result<Vec<User>, Error> {
        self.repository
            .find_all()
            .await
            .map_err(storage_failure(messages::FIND_ALL))
    }

    /// A single user; absent ids are not-found.
    pub async fn find_by_id(&self, id: &UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(storage_failure(messages::FIND_ONE))?
            .ok_or_else(|| Error::not_found(USER_RESOURCE))
    }

    /// Apply a partial update, re-hashing any new password.
    ///
    /// An empty patch still confirms the user exists and returns it.
    pub async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        let password_hash = match patch.password {
            Some(password) => Some(self.hash(password.as_str(), messages::UPDATE).await?),
            None => None,
        };
        let changes = UserChanges {
            name: patch.name,
            email: patch.email,
            password_hash,
            role: patch.role,
        };

        let updated = if changes.is_empty() {
            self.repository.find_by_id(id).await
        } else {
            self.repository.update(id, &changes).await
        };
        updated
            .map_err(storage_failure(messages::UPDATE))?
            .ok_or_else(|| Error::not_found(USER_RESOURCE))
    }

    /// Remove a user; absent ids are not-found.
    pub async fn delete(&self, id: &UserId) -> Result<(), Error> {
        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(storage_failure(messages::DELETE))?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found(USER_RESOURCE))
        }
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
