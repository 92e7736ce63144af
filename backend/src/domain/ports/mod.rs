//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (document store, password hashing, host probes). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants.

mod password_hasher;
mod system_probes;
mod user_repository;

#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use system_probes::{MockDatabaseProbe, MockHostMetrics};
pub use system_probes::{
    ConnectionState, DatabaseProbe, DiskReading, HostMetrics, MemoryReading, ProbeError,
};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
