//! Tests for users API handlers.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use crate::domain::ports::{MockUserRepository, UserPersistenceError};
use crate::inbound::http::configure;
use crate::inbound::http::state::HttpState;
use crate::test_support::{SAMPLE_USER_ID, http_state, http_state_with, sample_user};

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure)
}

async fn send(state: HttpState, request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(state)).await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

fn violation_paths(body: &Value) -> Vec<&str> {
    body.get("errors")
        .and_then(Value::as_array)
        .expect("errors present")
        .iter()
        .filter_map(|entry| entry.get("path").and_then(Value::as_str))
        .collect()
}

/// Repository that fails the test if any method is called.
fn untouched_repository() -> HttpState {
    http_state_with(Arc::new(MockUserRepository::new()))
}

#[rstest]
#[case(actix_test::TestRequest::get().uri("/api/v1/users/123"))]
#[case(actix_test::TestRequest::put().uri("/api/v1/users/123").set_json(json!({"name": "Ada"})))]
#[case(actix_test::TestRequest::delete().uri("/api/v1/users/zzzzzzzzzzzzzzzzzzzzzzzz"))]
#[actix_web::test]
async fn malformed_id_is_rejected_before_storage(#[case] request: actix_test::TestRequest) {
    let (status, body) = send(untouched_repository(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("VALIDATION_ERROR")
    );
    assert_eq!(violation_paths(&body), vec!["params.id"]);
    assert_eq!(
        body.pointer("/errors/0/message").and_then(Value::as_str),
        Some("Invalid identifier format")
    );
}

#[actix_web::test]
async fn create_reports_every_violation() {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"name": "A", "email": "nope", "password": 12345, "role": "root"}));

    let (status, body) = send(untouched_repository(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Validation error")
    );
    assert_eq!(
        violation_paths(&body),
        vec!["body.name", "body.email", "body.password", "body.role"]
    );
    let messages: Vec<&str> = body
        .get("errors")
        .and_then(Value::as_array)
        .expect("errors present")
        .iter()
        .filter_map(|entry| entry.get("message").and_then(Value::as_str))
        .collect();
    assert_eq!(
        messages,
        vec![
            "Name must be at least 2 characters",
            "Invalid email format",
            "Expected string, received number",
            "Invalid enum value. Expected 'user' | 'admin'",
        ]
    );
}

#[actix_web::test]
async fn create_without_body_lists_required_fields() {
    let request = actix_test::TestRequest::post().uri("/api/v1/users");

    let (status, body) = send(untouched_repository(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        violation_paths(&body),
        vec!["body.name", "body.email", "body.password"]
    );
}

#[actix_web::test]
async fn malformed_json_is_a_body_violation() {
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"name\":");

    let (status, body) = send(untouched_repository(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violation_paths(&body), vec!["body"]);
}

#[actix_web::test]
async fn create_returns_user_without_password() {
    let request = actix_test::TestRequest::post().uri("/api/v1/users").set_json(json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "password": "secret1"
    }));

    let (status, body) = send(http_state(), request).await;

    assert_eq!(status, StatusCode::CREATED);
    let data = body.get("data").expect("data envelope");
    assert_eq!(data.get("role").and_then(Value::as_str), Some("user"));
    assert_eq!(
        data.get("createdAt").and_then(Value::as_str),
        Some("2024-05-01T12:00:00Z")
    );
    assert!(data.get("password").is_none());
    assert_eq!(
        data.get("id").and_then(Value::as_str).map(str::len),
        Some(24)
    );
}

#[actix_web::test]
async fn list_wraps_users_in_data_envelope() {
    let mut repository = MockUserRepository::new();
    repository
        .expect_find_all()
        .return_once(|| Ok(vec![sample_user()]));

    let (status, body) = send(
        http_state_with(Arc::new(repository)),
        actix_test::TestRequest::get().uri("/api/v1/users"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": [{
            "id": SAMPLE_USER_ID,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "role": "user",
            "createdAt": "2024-05-01T12:00:00Z"
        }]})
    );
}

#[actix_web::test]
async fn storage_failure_is_a_server_error() {
    let mut repository = MockUserRepository::new();
    repository
        .expect_find_all()
        .return_once(|| Err(UserPersistenceError::connection("pool closed")));

    let (status, body) = send(
        http_state_with(Arc::new(repository)),
        actix_test::TestRequest::get().uri("/api/v1/users"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"status": 500, "message": "Unable to find users", "code": "SERVER_ERROR"})
    );
}

#[rstest]
#[case(actix_test::TestRequest::get())]
#[case(actix_test::TestRequest::delete())]
#[case(actix_test::TestRequest::put().set_json(json!({"role": "admin"})))]
#[actix_web::test]
async fn missing_user_is_not_found(#[case] request: actix_test::TestRequest) {
    let request = request.uri(&format!("/api/v1/users/{SAMPLE_USER_ID}"));

    let (status, body) = send(http_state(), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": 404, "message": "User not found", "code": "RESOURCE_NOT_FOUND"})
    );
}

#[actix_web::test]
async fn unknown_route_uses_error_envelope() {
    let (status, body) = send(
        http_state(),
        actix_test::TestRequest::get().uri("/api/v1/widgets"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"status": 404, "message": "Route not found", "code": "ERROR_404"})
    );
}
