//! Health endpoint.
//!
//! ```text
//! GET /api/v1/health
//! ```
//!
//! Always answers 200; the verdict lives in the body's `status` field.

use actix_web::{HttpResponse, get, web};

use crate::inbound::http::cache_control::no_store_header;
use crate::inbound::http::state::HttpState;

/// Report process, host, and database status.
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> HttpResponse {
    let report = state.health.report().await;
    HttpResponse::Ok()
        .insert_header(no_store_header())
        .json(report)
}
