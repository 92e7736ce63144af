//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON envelopes and status
//! codes. This is the only place failures are logged.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::domain::{Error, ErrorKind, FieldViolation};
use crate::middleware::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Code logged for failures nobody classified.
pub const UNHANDLED_ERROR_CODE: &str = "UNHANDLED_ERROR";

/// JSON envelope returned for every failure.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    status: u16,
    message: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldViolation]>,
}

fn log_failure(error: &Error) {
    let trace_id = TraceId::current().map(|id| id.to_string());
    if error.kind() == ErrorKind::Unexpected {
        error!(
            trace_id = trace_id.as_deref(),
            "[{UNHANDLED_ERROR_CODE}] {}: {}",
            error.status(),
            error.message()
        );
    } else {
        error!(trace_id = trace_id.as_deref(), "{error}");
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        log_failure(self);
        let code = self.code();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            status: self.status_code().as_u16(),
            message: self.public_message(),
            code: code.as_ref(),
            errors: self.errors(),
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        Self::unexpected(format!("actix error promoted to domain error: {err}"))
    }
}

/// Fallback for requests no route matched.
///
/// # Errors
///
/// Always returns the 404 envelope.
pub async fn route_not_found() -> ApiResult<HttpResponse> {
    Err(Error::new(ErrorKind::Status(404), "Route not found"))
}

#[cfg(test)]
mod tests;
