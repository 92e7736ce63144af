//! Port abstraction for user persistence adapters and their errors.
//!
//! Adapters report storage failures through [`UserPersistenceError`]; the
//! user service decides how each variant surfaces to callers. A missing
//! record is not an error at this layer: lookups return `None` and deletes
//! return `false`.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewUserRecord, User, UserChanges, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// A uniqueness constraint (the email index) rejected the write.
    #[error("duplicate key: {message}")]
    DuplicateKey { message: String },
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
}

impl UserPersistenceError {
    /// Helper for uniqueness violations.
    pub fn duplicate_key(message: impl Into<String>) -> Self {
        Self::DuplicateKey {
            message: message.into(),
        }
    }

    /// Helper for connectivity failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Persistence port for the user collection.
///
/// Returned users never carry a password; adapters must project it away.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; storage assigns `id` and `created_at`.
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError>;

    /// Every stored user in insertion order.
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Apply `changes` and return the updated user, or `None` when absent.
    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user; `false` when nothing matched.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
