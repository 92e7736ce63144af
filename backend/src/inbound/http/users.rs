//! Users API handlers.
//!
//! ```text
//! GET    /api/v1/users
//! GET    /api/v1/users/{id}
//! POST   /api/v1/users {"name":"Ada","email":"ada@example.com","password":"secret1"}
//! PUT    /api/v1/users/{id} {"role":"admin"}
//! DELETE /api/v1/users/{id}
//! ```
//!
//! Every handler validates the raw request against its [`Schema`] before
//! touching the service, so malformed identifiers never reach storage.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::{Error, FieldViolation, Role, User, UserDraft, UserId, UserPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldRule, ID_PARAM, Location, RequestInput, Rule, Schema,
};

const ROLES: &[&str] = &["user", "admin"];

const NAME: Rule = Rule::Text {
    min: 2,
    max: 50,
    too_short: "Name must be at least 2 characters",
    too_long: "Name cannot exceed 50 characters",
};
const EMAIL: Rule = Rule::Email {
    message: "Invalid email format",
};
const PASSWORD: Rule = Rule::Text {
    min: 6,
    max: 100,
    too_short: "Password must be at least 6 characters",
    too_long: "Password cannot exceed 100 characters",
};
const ROLE: Rule = Rule::OneOf { values: ROLES };

const USER_ID_FIELDS: &[FieldRule] = &[ID_PARAM];

const CREATE_USER_FIELDS: &[FieldRule] = &[
    FieldRule::required(Location::Body, "name", NAME),
    FieldRule::required(Location::Body, "email", EMAIL),
    FieldRule::required(Location::Body, "password", PASSWORD),
    FieldRule::optional(Location::Body, "role", ROLE),
];

const UPDATE_USER_FIELDS: &[FieldRule] = &[
    ID_PARAM,
    FieldRule::optional(Location::Body, "name", NAME),
    FieldRule::optional(Location::Body, "email", EMAIL),
    FieldRule::optional(Location::Body, "password", PASSWORD),
    FieldRule::optional(Location::Body, "role", ROLE),
];

/// `GET` and `DELETE` on `/users/{id}`.
pub const USER_ID_SCHEMA: Schema = Schema::new(USER_ID_FIELDS);

/// `POST /users`.
pub const CREATE_USER_SCHEMA: Schema = Schema::new(CREATE_USER_FIELDS);

/// `PUT /users/{id}`.
pub const UPDATE_USER_SCHEMA: Schema = Schema::new(UPDATE_USER_FIELDS);

/// Request body for `POST /api/v1/users`.
#[derive(Deserialize)]
struct CreateUserRequest {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Role,
}

impl From<CreateUserRequest> for UserDraft {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: Zeroizing::new(value.password),
            role: value.role,
        }
    }
}

/// Request body for `PUT /api/v1/users/{id}`.
#[derive(Deserialize)]
struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<Role>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password.map(Zeroizing::new),
            role: value.role,
        }
    }
}

/// User as rendered on the wire. There is no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Storage-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Authorisation role.
    pub role: Role,
    /// Creation time, RFC 3339.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.into(),
            name: value.name,
            email: value.email,
            role: value.role,
            created_at: value.created_at,
        }
    }
}

/// `{"data": ...}` success envelope.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    /// Response payload.
    pub data: T,
}

fn validated(req: &HttpRequest, payload: &[u8], schema: Schema) -> Result<RequestInput, Error> {
    let input = RequestInput::from_request(req, payload)?;
    schema.check(&input)?;
    Ok(input)
}

fn path_id(input: &RequestInput) -> Result<UserId, Error> {
    UserId::new(input.param("id").unwrap_or_default()).map_err(|_| {
        Error::validation(vec![FieldViolation::new(
            "params.id",
            "Invalid identifier format",
        )])
    })
}

fn body_error(error: &serde_json::Error) -> Error {
    Error::validation(vec![FieldViolation::new("body", error.to_string())])
}

/// List every user in insertion order.
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let users = state.users.find_all().await?;
    let data: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(DataEnvelope { data }))
}

/// Fetch one user.
#[get("/users/{id}")]
pub async fn get_user(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let input = validated(&req, &[], USER_ID_SCHEMA)?;
    let user = state.users.find_by_id(&path_id(&input)?).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope {
        data: UserResponse::from(user),
    }))
}

/// Create a user; the role defaults to `user`.
///
/// Body read failures (oversized or aborted payloads) surface through the
/// domain error so they keep the JSON envelope.
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: Result<web::Bytes, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let payload = payload.map_err(Error::from)?;
    let input = validated(&req, &payload, CREATE_USER_SCHEMA)?;
    let request = CreateUserRequest::deserialize(input.body()).map_err(|err| body_error(&err))?;
    let user = state.users.create(request.into()).await?;
    Ok(HttpResponse::Created().json(DataEnvelope {
        data: UserResponse::from(user),
    }))
}

/// Apply a partial update.
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: Result<web::Bytes, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let payload = payload.map_err(Error::from)?;
    let input = validated(&req, &payload, UPDATE_USER_SCHEMA)?;
    let id = path_id(&input)?;
    let request = UpdateUserRequest::deserialize(input.body()).map_err(|err| body_error(&err))?;
    let user = state.users.update(&id, request.into()).await?;
    Ok(HttpResponse::Ok().json(DataEnvelope {
        data: UserResponse::from(user),
    }))
}

/// Remove a user.
#[delete("/users/{id}")]
pub async fn delete_user(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let input = validated(&req, &[], USER_ID_SCHEMA)?;
    state.users.delete(&path_id(&input)?).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
