//! MongoDB persistence adapters.
//!
//! This module provides concrete implementations of the user repository
//! port backed by the official MongoDB driver, plus an in-memory twin used
//! by tests.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   BSON documents and domain types. No business logic resides here.
//! - **Internal documents**: Stored shapes are private to each adapter and
//!   never exposed to the domain layer.
//! - **Shared client**: The driver pools connections internally;
//!   [`MongoStore`] is cheap to clone.
//! - **Strongly typed errors**: Driver failures are mapped to
//!   [`UserPersistenceError`](crate::domain::ports::UserPersistenceError)
//!   variants, with duplicate keys kept distinct.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use user_service::outbound::persistence::{
//!     ConnectionTracker, MongoStore, MongoUserRepository, StoreConfig,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::new("mongodb://localhost:27017", "app");
//! let store = MongoStore::connect(&config, ConnectionTracker::default()).await?;
//! let repo = MongoUserRepository::new(store.database(), Arc::new(mockable::DefaultClock));
//! repo.ensure_indexes().await?;
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod client;
mod memory_user_repository;
mod mongo_user_repository;

pub use bootstrap::{
    BootstrapError, BootstrapState, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, RetryPolicy,
    Sleeper, TokioSleeper, connect_with_retry,
};
pub use client::{ConnectionTracker, MongoDatabaseProbe, MongoStore, StoreConfig, StoreError};
pub use memory_user_repository::MemoryUserRepository;
pub use mongo_user_repository::{MongoUserRepository, USERS_COLLECTION};
