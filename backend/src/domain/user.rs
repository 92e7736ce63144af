//! User data model.
//!
//! The outbound [`User`] has no password field at all, so no code path can
//! leak a hash into a response. Plain-text passwords only exist inside
//! [`UserDraft`] and [`UserPatch`], wrapped in [`Zeroizing`] buffers until
//! they are hashed.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

/// Validation errors returned by the user primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Identifier is not 24 hexadecimal characters.
    #[error("user id must be 24 hexadecimal characters")]
    InvalidId,
    /// Role is not one of the known values.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Pattern every storage-assigned identifier satisfies.
pub const USER_ID_PATTERN: &str = "^[0-9a-fA-F]{24}$";

static USER_ID_RE: OnceLock<Regex> = OnceLock::new();

/// Compiled [`USER_ID_PATTERN`].
pub fn user_id_regex() -> &'static Regex {
    USER_ID_RE.get_or_init(|| {
        Regex::new(USER_ID_PATTERN)
            .unwrap_or_else(|error| panic!("user id regex failed to compile: {error}"))
    })
}

/// Storage-assigned user identifier, normalised to lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::UserId;
    ///
    /// let id = UserId::new("64B7F0C2A1E4D3F5B6A7C8D9").expect("valid id");
    /// assert_eq!(id.as_ref(), "64b7f0c2a1e4d3f5b6a7c8d9");
    /// assert!(UserId::new("not-an-id").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if !user_id_regex().is_match(raw) {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authorisation role recorded on a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account.
    #[default]
    User,
    /// Administrative account.
    Admin,
}

impl Role {
    /// Every accepted role, in declaration order.
    pub const ALL: [Self; 2] = [Self::User, Self::Admin];

    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| UserValidationError::UnknownRole(value.to_owned()))
    }
}

/// A stored user as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Storage-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Authorisation role.
    pub role: Role,
    /// Creation time, immutable.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user, prior to hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: Zeroizing<String>,
    /// Requested role.
    pub role: Role,
}

/// Partial update input, prior to hashing. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement plain-text password.
    pub password: Option<Zeroizing<String>>,
    /// Replacement role.
    pub role: Option<Role>,
}

/// Persistence-ready user record with a hashed password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// One-way password hash.
    pub password_hash: String,
    /// Authorisation role.
    pub role: Role,
}

/// Persistence-ready partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement email address.
    pub email: Option<String>,
    /// Replacement password hash.
    pub password_hash: Option<String>,
    /// Replacement role.
    pub role: Option<Role>,
}

impl UserChanges {
    /// True when the update would not modify anything.
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
    }
}
