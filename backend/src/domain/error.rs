//! Domain-level error taxonomy.
//!
//! These errors are transport agnostic. Every failure the service can surface
//! is classified by an [`ErrorKind`]; inbound adapters translate the kind into
//! a protocol-specific envelope. The numeric status travels with the kind so
//! the mapping lives in exactly one table.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Message used for every failure whose detail must stay server-side.
pub const REDACTED_MESSAGE: &str = "Internal server error";

/// Machine code attached to server-side failures.
pub const SERVER_ERROR_CODE: &str = "SERVER_ERROR";

/// A single violated constraint reported by request validation.
///
/// `path` is dotted and rooted at the request part, e.g. `params.id` or
/// `body.email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    path: String,
    message: String,
}

impl FieldViolation {
    /// Record a violation for `path`.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Dotted field path.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Human-readable description of the violation.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Closed set of failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request failed schema validation.
    Validation,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The addressed resource does not exist.
    NotFound,
    /// The resource collides with an existing one.
    Conflict,
    /// A classified server-side failure with a caller-safe message.
    Server,
    /// Any other HTTP-style status raised explicitly.
    Status(u16),
    /// A failure nobody classified; its detail must never reach the caller.
    Unexpected,
}

impl ErrorKind {
    /// Numeric status associated with the class.
    pub const fn status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Server | Self::Unexpected => 500,
            Self::Status(status) => status,
        }
    }
}

/// Classified domain failure.
///
/// ## Invariants
/// - `errors` is only populated for [`ErrorKind::Validation`].
/// - When `code` is unset, [`Error::code`] falls back to `ERROR_<status>`.
///
/// # Examples
/// ```
/// use user_service::domain::{Error, ErrorKind};
///
/// let err = Error::not_found("User");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.message(), "User not found");
/// assert_eq!(err.code(), "RESOURCE_NOT_FOUND");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    code: Option<Cow<'static, str>>,
    errors: Option<Vec<FieldViolation>>,
}

impl Error {
    /// Create an error of `kind` without a machine code.
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::{Error, ErrorKind};
    ///
    /// let err = Error::new(ErrorKind::Status(418), "teapot");
    /// assert_eq!(err.code(), "ERROR_418");
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            errors: None,
        }
    }

    /// Override the machine-readable code.
    pub fn with_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Validation failure carrying every violated constraint.
    pub fn validation(errors: Vec<FieldViolation>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::new(ErrorKind::Validation, "Validation error").with_code("VALIDATION_ERROR")
        }
    }

    /// Convenience constructor for [`ErrorKind::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message).with_code("UNAUTHORIZED")
    }

    /// Convenience constructor for [`ErrorKind::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message).with_code("FORBIDDEN")
    }

    /// `<resource> not found`.
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, format!("{resource} not found"))
            .with_code("RESOURCE_NOT_FOUND")
    }

    /// `<resource> already exists`.
    pub fn conflict(resource: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Conflict, format!("{resource} already exists"))
            .with_code("RESOURCE_CONFLICT")
    }

    /// Classified server failure; `message` is shown to the caller.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, message).with_code(SERVER_ERROR_CODE)
    }

    /// Unclassified failure. `detail` is kept for server-side logs only.
    pub fn unexpected(detail: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Unexpected, detail.to_string()).with_code(SERVER_ERROR_CODE)
    }

    /// Failure class.
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Numeric status for the failure class.
    pub const fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Stable machine-readable code, defaulting to `ERROR_<status>`.
    pub fn code(&self) -> Cow<'_, str> {
        match &self.code {
            Some(code) => Cow::Borrowed(code.as_ref()),
            None => Cow::Owned(format!("ERROR_{}", self.status())),
        }
    }

    /// Message as recorded at the point of detection.
    ///
    /// For [`ErrorKind::Unexpected`] this is internal detail; use
    /// [`Error::public_message`] for anything a caller sees.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Message safe to expose outside the process.
    pub fn public_message(&self) -> &str {
        match self.kind {
            ErrorKind::Unexpected => REDACTED_MESSAGE,
            _ => self.message(),
        }
    }

    /// Field violations for validation failures.
    pub fn errors(&self) -> Option<&[FieldViolation]> {
        self.errors.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code(), self.status(), self.message)
    }
}

impl std::error::Error for Error {}
