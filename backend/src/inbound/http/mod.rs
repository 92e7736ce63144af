//! HTTP inbound adapter exposing REST endpoints under `/api/v1`.

pub mod cache_control;
pub mod error;
pub mod health;
pub mod state;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::{ApiResult, route_not_found};

/// Versioned path prefix shared by every route.
pub const API_PREFIX: &str = "/api/v1";

/// Largest request body accepted, in bytes.
pub const BODY_LIMIT: usize = 100 * 1024;

/// Register every route. Unmatched paths fall through to the JSON 404
/// envelope; bodies over [`BODY_LIMIT`] are refused with the JSON 500
/// envelope.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_service::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .app_data(web::PayloadConfig::new(BODY_LIMIT))
            .service(health::health)
            .service(users::list_users)
            .service(users::get_user)
            .service(users::create_user)
            .service(users::update_user)
            .service(users::delete_user),
    )
    .default_service(web::to(route_not_found));
}
