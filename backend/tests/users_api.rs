//! End-to-end behaviour of the `/api/v1/users` routes over the in-memory
//! repository.
//!
//! Each test drives the fully configured application, including request
//! logging, so status codes, envelopes, and headers are observed exactly as
//! a client would see them.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{Method, StatusCode, header};
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use user_service::RequestLog;
use user_service::inbound::http::{BODY_LIMIT, configure};
use user_service::middleware::TRACE_ID_HEADER;
use user_service::outbound::persistence::MemoryUserRepository;
use user_service::test_support::{FixedClock, http_state_with};

const MISSING_ID: &str = "0123456789abcdef01234567";

struct Harness {
    repository: Arc<MemoryUserRepository>,
}

impl Harness {
    fn new() -> Self {
        Self {
            repository: Arc::new(MemoryUserRepository::new(Arc::new(FixedClock::default()))),
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(http_state_with(self.repository.clone())))
                .wrap(RequestLog)
                .configure(configure),
        )
        .await;
        let mut request = actix_test::TestRequest::default().method(method).uri(uri);
        if let Some(body) = body {
            request = request.set_json(body);
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        assert!(response.headers().contains_key(TRACE_ID_HEADER));
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    async fn call_raw(&self, method: Method, uri: &str, payload: Vec<u8>) -> ServiceResponse {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(http_state_with(self.repository.clone())))
                .wrap(RequestLog)
                .configure(configure),
        )
        .await;
        let request = actix_test::TestRequest::default()
            .method(method)
            .uri(uri)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload(payload)
            .to_request();
        actix_test::call_service(&app, request).await
    }

    async fn create(&self, body: Value) -> Value {
        let (status, value) = self.call(Method::POST, "/api/v1/users", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {value}");
        value.get("data").cloned().expect("data envelope")
    }
}

fn ada() -> Value {
    json!({"name": "Ada Lovelace", "email": "ada@example.com", "password": "analytical"})
}

fn id_of(user: &Value) -> String {
    user.get("id")
        .and_then(Value::as_str)
        .expect("id present")
        .to_owned()
}

#[actix_web::test]
async fn create_then_get_round_trips_everything_but_the_password() {
    let harness = Harness::new();

    let created = harness.create(ada()).await;
    let id = id_of(&created);
    let (status, fetched) = harness
        .call(Method::GET, &format!("/api/v1/users/{id}"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let fetched = fetched.get("data").expect("data envelope");
    assert_eq!(fetched, &created);
    assert_eq!(fetched.get("name"), Some(&json!("Ada Lovelace")));
    assert_eq!(fetched.get("email"), Some(&json!("ada@example.com")));
    assert_eq!(fetched.get("role"), Some(&json!("user")));
    assert!(fetched.get("password").is_none());

    let user_id = user_service::domain::UserId::new(&id).expect("valid id");
    let stored = harness.repository.password_hash(&user_id).expect("hash stored");
    assert!(bcrypt::verify("analytical", &stored).expect("bcrypt hash"));
}

#[actix_web::test]
async fn duplicate_email_conflicts() {
    let harness = Harness::new();
    harness.create(ada()).await;

    let (status, body) = harness
        .call(Method::POST, "/api/v1/users", Some(ada()))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body,
        json!({
            "status": 409,
            "message": "User with this email already exists",
            "code": "RESOURCE_CONFLICT"
        })
    );
}

#[actix_web::test]
async fn list_returns_users_in_insertion_order() {
    let harness = Harness::new();
    harness.create(ada()).await;
    harness
        .create(json!({
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "password": "compiler",
            "role": "admin"
        }))
        .await;

    let (status, body) = harness.call(Method::GET, "/api/v1/users", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .get("data")
        .and_then(Value::as_array)
        .expect("array")
        .iter()
        .filter_map(|user| user.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);
}

#[actix_web::test]
async fn partial_update_changes_only_supplied_fields() {
    let harness = Harness::new();
    let created = harness.create(ada()).await;
    let id = id_of(&created);

    let (status, body) = harness
        .call(
            Method::PUT,
            &format!("/api/v1/users/{id}"),
            Some(json!({"role": "admin"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let updated = body.get("data").expect("data envelope");
    assert_eq!(updated.get("role"), Some(&json!("admin")));
    assert_eq!(updated.get("name"), created.get("name"));
    assert_eq!(updated.get("email"), created.get("email"));
    assert_eq!(updated.get("createdAt"), created.get("createdAt"));
}

#[actix_web::test]
async fn password_update_is_rehashed() {
    let harness = Harness::new();
    let id = id_of(&harness.create(ada()).await);
    let user_id = user_service::domain::UserId::new(&id).expect("valid id");
    let before = harness.repository.password_hash(&user_id).expect("hash");

    let (status, body) = harness
        .call(
            Method::PUT,
            &format!("/api/v1/users/{id}"),
            Some(json!({"password": "difference engine"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.pointer("/data/password").is_none());
    let after = harness.repository.password_hash(&user_id).expect("hash");
    assert_ne!(before, after);
    assert!(bcrypt::verify("difference engine", &after).expect("bcrypt hash"));
}

#[actix_web::test]
async fn update_validates_present_fields() {
    let harness = Harness::new();
    let id = id_of(&harness.create(ada()).await);

    let (status, body) = harness
        .call(
            Method::PUT,
            &format!("/api/v1/users/{id}"),
            Some(json!({"name": "x".repeat(51), "password": "short"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("errors"),
        Some(&json!([
            {"path": "body.name", "message": "Name cannot exceed 50 characters"},
            {"path": "body.password", "message": "Password must be at least 6 characters"}
        ]))
    );
}

#[actix_web::test]
async fn delete_then_get_is_not_found_and_delete_again_is_not_found() {
    let harness = Harness::new();
    let id = id_of(&harness.create(ada()).await);
    let uri = format!("/api/v1/users/{id}");

    let (deleted, body) = harness.call(Method::DELETE, &uri, None).await;
    assert_eq!(deleted, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (fetched, _) = harness.call(Method::GET, &uri, None).await;
    assert_eq!(fetched, StatusCode::NOT_FOUND);

    let (again, body) = harness.call(Method::DELETE, &uri, None).await;
    assert_eq!(again, StatusCode::NOT_FOUND);
    assert_eq!(body.get("code"), Some(&json!("RESOURCE_NOT_FOUND")));
}

#[rstest]
#[case(Method::GET, None)]
#[case(Method::PUT, Some(json!({"name": "Ada"})))]
#[case(Method::DELETE, None)]
#[actix_web::test]
async fn well_formed_missing_id_is_not_found(#[case] method: Method, #[case] body: Option<Value>) {
    let harness = Harness::new();

    let (status, response) = harness
        .call(method, &format!("/api/v1/users/{MISSING_ID}"), body)
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response.get("message"), Some(&json!("User not found")));
}

#[rstest]
#[case(Method::GET)]
#[case(Method::PUT)]
#[case(Method::DELETE)]
#[actix_web::test]
async fn ill_formed_id_is_a_validation_error(#[case] method: Method) {
    let harness = Harness::new();

    let (status, body) = harness
        .call(method, "/api/v1/users/not-an-object-id", None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("status"), Some(&json!(400)));
    assert_eq!(
        body.pointer("/errors/0/path").and_then(Value::as_str),
        Some("params.id")
    );
}

fn oversized_body() -> Vec<u8> {
    let padding = "a".repeat(BODY_LIMIT * 3);
    serde_json::to_vec(&json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "password": padding
    }))
    .expect("serialise body")
}

#[rstest]
#[case(Method::POST, "/api/v1/users".to_owned())]
#[case(Method::PUT, format!("/api/v1/users/{MISSING_ID}"))]
#[actix_web::test]
async fn oversized_body_keeps_the_json_envelope(#[case] method: Method, #[case] uri: String) {
    let harness = Harness::new();

    let response = harness.call_raw(method, &uri, oversized_body()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/json")
    );
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({
            "status": 500,
            "message": "Internal server error",
            "code": "SERVER_ERROR"
        })
    );

    let (_, listed) = harness.call(Method::GET, "/api/v1/users", None).await;
    assert_eq!(listed, json!({"data": []}));
}
