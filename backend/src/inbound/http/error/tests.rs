//! Tests for HTTP error mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;

async fn body_of(error: &Error) -> (StatusCode, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    (
        status,
        serde_json::from_slice(&bytes).expect("error body is JSON"),
    )
}

#[rstest]
#[case(Error::validation(Vec::new()), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("Unauthorized access"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("Access forbidden"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("User"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("User"), StatusCode::CONFLICT)]
#[case(Error::server("Unable to find users"), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(Error::new(ErrorKind::Status(418), "teapot"), StatusCode::IM_A_TEAPOT)]
#[case(Error::unexpected("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_kind(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[rstest]
fn out_of_range_status_falls_back_to_500() {
    let error = Error::new(ErrorKind::Status(42), "odd");
    assert_eq!(
        ResponseError::status_code(&error),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[rstest]
#[actix_web::test]
async fn validation_body_lists_violations() {
    let error = Error::validation(vec![FieldViolation::new(
        "params.id",
        "Invalid identifier format",
    )]);

    let (status, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "status": 400,
            "message": "Validation error",
            "code": "VALIDATION_ERROR",
            "errors": [{ "path": "params.id", "message": "Invalid identifier format" }]
        })
    );
}

#[rstest]
#[actix_web::test]
async fn classified_body_omits_errors() {
    let (status, body) = body_of(&Error::conflict("User with this email")).await;

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

#[rstest]
#[actix_web::test]
async fn unexpected_failures_are_redacted() {
    let (status, body) = body_of(&Error::unexpected("socket exploded at 10.0.0.1")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "status": 500,
            "message": "Internal server error",
            "code": "SERVER_ERROR"
        })
    );
}

#[rstest]
#[actix_web::test]
async fn unnamed_status_uses_generated_code() {
    let (_, body) = body_of(&Error::new(ErrorKind::Status(404), "Route not found")).await;

    assert_eq!(body["code"], json!("ERROR_404"));
    assert_eq!(body["status"], json!(404));
}

#[rstest]
fn actix_errors_become_unexpected() {
    let actix = actix_web::error::ErrorBadGateway("upstream");

    let error = Error::from(actix);

    assert_eq!(error.kind(), ErrorKind::Unexpected);
    assert_eq!(error.public_message(), "Internal server error");
}
