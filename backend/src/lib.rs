//! User service library.
//!
//! A small REST service managing user accounts in MongoDB, plus a health
//! endpoint that aggregates process, host, and database status.
//!
//! Layout follows ports and adapters:
//! - [`domain`] holds entities, ports, and use-cases with no I/O.
//! - [`inbound`] turns HTTP requests into use-case calls.
//! - [`outbound`] implements the ports against MongoDB, bcrypt, and the
//!   local host.
//! - [`middleware`] carries request-scoped concerns such as trace ids.

pub mod config;
pub mod domain;
pub mod example_data;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::RequestLog;
