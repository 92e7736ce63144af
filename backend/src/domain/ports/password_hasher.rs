//! Port for one-way password hashing.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by password hashing adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

impl PasswordHashError {
    /// Wrap an adapter failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces storable hashes from plain-text passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password`; the result is safe to persist.
    async fn hash(&self, password: &str) -> Result<String, PasswordHashError>;
}
