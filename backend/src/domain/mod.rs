//! Domain primitives, ports, and use-cases.
//!
//! Purpose: Define strongly typed entities and the services that operate
//! on them without depending on HTTP or storage. Adapters live in
//! `inbound` and `outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — classified failure rendered by the
//!   HTTP adapter.
//! - User and its input/record types (`user`).
//! - UserService — CRUD use-cases over the repository port.
//! - HealthAggregator — concurrent status probes and verdict.
//! - ExampleDataSeeder — demonstration accounts for empty collections.

pub mod error;
pub mod example_data;
pub mod health;
pub mod ports;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorKind, FieldViolation};
pub use self::example_data::{
    EXAMPLE_USERS, ExampleDataSeedOutcome, ExampleDataSeeder, ExampleDataSeedingError,
    SeedingResult,
};
pub use self::health::{HealthAggregator, HealthMetadata, HealthReport, HealthStatus};
pub use self::user::{
    NewUserRecord, Role, User, UserChanges, UserDraft, UserId, UserPatch, UserValidationError,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use user_service::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("Access forbidden"))
/// }
/// assert_eq!(handler().unwrap_err().status(), 403);
/// ```
pub type ApiResult<T> = Result<T, Error>;
