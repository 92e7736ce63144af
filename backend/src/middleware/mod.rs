//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! trace correlation, access logging, and response hardening.

pub mod hardening;
pub mod request_log;

pub use hardening::{cors, security_headers};
pub use request_log::{RequestLog, TRACE_ID_HEADER, TraceId};
