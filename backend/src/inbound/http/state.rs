//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data`, so they depend on
//! domain use-cases only and stay testable without a database.

use std::sync::Arc;

use crate::domain::{HealthAggregator, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User CRUD use-cases.
    pub users: Arc<UserService>,
    /// Health report collection.
    pub health: Arc<HealthAggregator>,
}

impl HttpState {
    /// Bundle the use-cases behind the HTTP surface.
    pub const fn new(users: Arc<UserService>, health: Arc<HealthAggregator>) -> Self {
        Self { users, health }
    }
}
