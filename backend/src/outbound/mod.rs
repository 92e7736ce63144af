//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: MongoDB-backed user repository, connection bootstrap,
//!   and the database health probe
//! - **host**: `sysinfo`-backed CPU, memory, and disk readings
//! - **security**: bcrypt password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod host;
pub mod persistence;
pub mod security;
