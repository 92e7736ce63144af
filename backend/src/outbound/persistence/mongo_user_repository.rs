//! MongoDB-backed `UserRepository` implementation.
//!
//! Documents carry the password hash, but every read projects it away so
//! the mapped [`User`] never sees it. Driver failures are classified into
//! [`UserPersistenceError`] variants; duplicate-key write errors (code
//! 11000) become [`UserPersistenceError::DuplicateKey`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mockable::Clock;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, Document, doc};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUserRecord, Role, User, UserChanges, UserId};

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Stored shape of a user, password included.
#[derive(Debug, Serialize)]
struct NewUserDocument {
    name: String,
    email: String,
    password: String,
    role: &'static str,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

/// Projected read shape; the password is never fetched.
#[derive(Debug, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    role: String,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

fn without_password() -> Document {
    doc! { "password": 0 }
}

fn to_chrono(value: bson::DateTime) -> Result<DateTime<Utc>, UserPersistenceError> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis())
        .ok_or_else(|| UserPersistenceError::query("stored createdAt is out of range"))
}

impl TryFrom<UserDocument> for User {
    type Error = UserPersistenceError;

    fn try_from(document: UserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(document.id.to_hex())
                .map_err(|err| UserPersistenceError::query(err.to_string()))?,
            name: document.name,
            email: document.email,
            role: document
                .role
                .parse::<Role>()
                .map_err(|err| UserPersistenceError::query(err.to_string()))?,
            created_at: to_chrono(document.created_at)?,
        })
    }
}

fn object_id(id: &UserId) -> Result<ObjectId, UserPersistenceError> {
    ObjectId::parse_str(id.as_ref()).map_err(|err| UserPersistenceError::query(err.to_string()))
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn is_connection_failure(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::Shutdown
    )
}

fn map_driver_error(error: mongodb::error::Error) -> UserPersistenceError {
    debug!(%error, "MongoDB operation failed");
    if is_duplicate_key(&error) {
        UserPersistenceError::duplicate_key(error.to_string())
    } else if is_connection_failure(&error) {
        UserPersistenceError::connection(error.to_string())
    } else {
        UserPersistenceError::query(error.to_string())
    }
}

fn set_document(changes: &UserChanges) -> Document {
    let mut set = Document::new();
    if let Some(name) = &changes.name {
        set.insert("name", name.as_str());
    }
    if let Some(email) = &changes.email {
        set.insert("email", email.as_str());
    }
    if let Some(password_hash) = &changes.password_hash {
        set.insert("password", password_hash.as_str());
    }
    if let Some(role) = changes.role {
        set.insert("role", role.as_str());
    }
    set
}

/// MongoDB adapter for the user collection.
#[derive(Clone)]
pub struct MongoUserRepository {
    database: Database,
    clock: Arc<dyn Clock>,
}

impl MongoUserRepository {
    /// Create a repository over `database`; `clock` stamps `createdAt`.
    pub fn new(database: Database, clock: Arc<dyn Clock>) -> Self {
        Self { database, clock }
    }

    fn reader(&self) -> Collection<UserDocument> {
        self.database.collection(USERS_COLLECTION)
    }

    /// Create the unique email index if it is missing.
    ///
    /// # Errors
    ///
    /// Returns the classified driver failure.
    pub async fn ensure_indexes(&self) -> Result<(), UserPersistenceError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.reader()
            .create_index(index)
            .await
            .map(drop)
            .map_err(map_driver_error)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let created_at = bson::DateTime::from_millis(self.clock.utc().timestamp_millis());
        let document = NewUserDocument {
            name: record.name.clone(),
            email: record.email.clone(),
            password: record.password_hash.clone(),
            role: record.role.as_str(),
            created_at,
        };
        let inserted = self
            .database
            .collection::<NewUserDocument>(USERS_COLLECTION)
            .insert_one(document)
            .await
            .map_err(map_driver_error)?;
        let id = inserted
            .inserted_id
            .as_object_id()
            .ok_or_else(|| UserPersistenceError::query("inserted _id is not an ObjectId"))?;

        Ok(User {
            id: UserId::new(id.to_hex())
                .map_err(|err| UserPersistenceError::query(err.to_string()))?,
            name: record.name.clone(),
            email: record.email.clone(),
            role: record.role,
            created_at: to_chrono(created_at)?,
        })
    }

    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let documents: Vec<UserDocument> = self
            .reader()
            .find(doc! {})
            .projection(without_password())
            .sort(doc! { "_id": 1 })
            .await
            .map_err(map_driver_error)?
            .try_collect()
            .await
            .map_err(map_driver_error)?;
        documents.into_iter().map(User::try_from).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.reader()
            .find_one(doc! { "_id": object_id(id)? })
            .projection(without_password())
            .await
            .map_err(map_driver_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }
        self.reader()
            .find_one_and_update(
                doc! { "_id": object_id(id)? },
                doc! { "$set": set_document(changes) },
            )
            .projection(without_password())
            .return_document(ReturnDocument::After)
            .await
            .map_err(map_driver_error)?
            .map(User::try_from)
            .transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let outcome = self
            .reader()
            .delete_one(doc! { "_id": object_id(id)? })
            .await
            .map_err(map_driver_error)?;
        Ok(outcome.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Document mapping coverage; driver calls are exercised against a live
    //! server only.
    use super::*;
    use rstest::rstest;

    const HEX: &str = "64b7f0c2a1e4d3f5b6a7c8d9";

    fn document(role: &str) -> UserDocument {
        UserDocument {
            id: ObjectId::parse_str(HEX).expect("valid object id"),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            role: role.to_owned(),
            created_at: bson::DateTime::from_millis(1_714_564_800_000),
        }
    }

    #[rstest]
    fn document_maps_to_user() {
        let user = User::try_from(document("admin")).expect("mapping succeeds");

        assert_eq!(user.id.as_ref(), HEX);
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.created_at.timestamp_millis(), 1_714_564_800_000);
    }

    #[rstest]
    fn unknown_role_is_a_query_error() {
        let error = User::try_from(document("root")).expect_err("unknown role");

        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn set_document_only_includes_supplied_fields() {
        let changes = UserChanges {
            email: Some("new@example.com".to_owned()),
            password_hash: Some("$2b$hash".to_owned()),
            ..UserChanges::default()
        };

        let set = set_document(&changes);

        assert_eq!(
            set,
            doc! { "email": "new@example.com", "password": "$2b$hash" }
        );
    }

    #[rstest]
    fn set_document_writes_role_as_text() {
        let changes = UserChanges {
            role: Some(Role::Admin),
            ..UserChanges::default()
        };

        assert_eq!(set_document(&changes), doc! { "role": "admin" });
    }
}
