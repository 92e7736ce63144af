//! Example user seeding.
//!
//! Populates an empty user collection with a fixed set of demonstration
//! accounts. Seeding is skipped whenever any user already exists, so
//! repeated startups never duplicate or overwrite data.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, UserPersistenceError, UserRepository,
};
use crate::domain::{NewUserRecord, Role};

/// Password shared by every example account.
pub const EXAMPLE_PASSWORD: &str = "password123";

/// A demonstration account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleUser {
    /// Display name.
    pub name: &'static str,
    /// Email address.
    pub email: &'static str,
    /// Role.
    pub role: Role,
}

/// Accounts inserted into an empty collection, in insertion order.
pub const EXAMPLE_USERS: [ExampleUser; 5] = [
    ExampleUser {
        name: "Admin User",
        email: "admin@example.com",
        role: Role::Admin,
    },
    ExampleUser {
        name: "Regular User",
        email: "user@example.com",
        role: Role::User,
    },
    ExampleUser {
        name: "John Doe",
        email: "john.doe@example.com",
        role: Role::User,
    },
    ExampleUser {
        name: "Jane Smith",
        email: "jane.smith@example.com",
        role: Role::User,
    },
    ExampleUser {
        name: "Super Admin",
        email: "superadmin@example.com",
        role: Role::Admin,
    },
];

/// Whether a seed run wrote anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedingResult {
    /// Example users were inserted.
    Applied,
    /// The collection already held users; nothing was written.
    AlreadySeeded,
}

/// Result of attempting to apply example data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleDataSeedOutcome {
    /// Number of users inserted.
    pub user_count: usize,
    /// Persistence outcome for the run.
    pub result: SeedingResult,
}

/// Errors raised while applying example data.
#[derive(Debug, Error)]
pub enum ExampleDataSeedingError {
    /// The shared password could not be hashed.
    #[error("example password hashing failed: {0}")]
    Hash(#[from] PasswordHashError),
    /// Persistence adapter failed while seeding.
    #[error("example data persistence error: {0}")]
    Persistence(#[from] UserPersistenceError),
}

/// Service that orchestrates example data seeding.
#[derive(Clone)]
pub struct ExampleDataSeeder {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl ExampleDataSeeder {
    /// Create a seeder over the given ports.
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Insert [`EXAMPLE_USERS`] unless the collection already has users.
    ///
    /// # Errors
    ///
    /// Returns [`ExampleDataSeedingError`] if hashing or persistence fails.
    /// Users inserted before the failure are kept.
    pub async fn seed(&self) -> Result<ExampleDataSeedOutcome, ExampleDataSeedingError> {
        if !self.repository.find_all().await?.is_empty() {
            return Ok(ExampleDataSeedOutcome {
                user_count: 0,
                result: SeedingResult::AlreadySeeded,
            });
        }

        let password_hash = self.hasher.hash(EXAMPLE_PASSWORD).await?;
        for example in EXAMPLE_USERS {
            let record = NewUserRecord {
                name: example.name.to_owned(),
                email: example.email.to_owned(),
                password_hash: password_hash.clone(),
                role: example.role,
            };
            self.repository.insert(&record).await?;
        }

        Ok(ExampleDataSeedOutcome {
            user_count: EXAMPLE_USERS.len(),
            result: SeedingResult::Applied,
        })
    }
}
