//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{build_http_state, connect_store};

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::Compress;
use actix_web::{App, HttpServer, web};

use user_service::RequestLog;
use user_service::middleware::{cors, security_headers};
use user_service::inbound::http::configure;
use user_service::inbound::http::state::HttpState;

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http_state)
        .wrap(Compress::default())
        .wrap(cors())
        .wrap(security_headers())
        .wrap(RequestLog)
        .configure(configure)
}

/// Construct an Actix HTTP server over `http_state`.
///
/// # Returns
/// A [`Server`] that must be awaited to drive the listener. It stops on
/// SIGINT or SIGTERM once in-flight requests finish.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(http_state: HttpState, config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(config.bind_addr)?
        .run();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Application wiring coverage.
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;

    use super::*;
    use user_service::middleware::TRACE_ID_HEADER;
    use user_service::test_support::http_state;

    #[actix_web::test]
    async fn responses_are_hardened_and_compressed() {
        let app = actix_test::init_service(build_app(web::Data::new(http_state()))).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users")
                .insert_header((header::ORIGIN, "https://client.example"))
                .insert_header((header::ACCEPT_ENCODING, "gzip"))
                .to_request(),
        )
        .await;

        let headers = response.headers();
        assert_eq!(
            headers.get("X-Content-Type-Options").and_then(|v| v.to_str().ok()),
            Some("nosniff")
        );
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(
            headers.get(header::CONTENT_ENCODING).and_then(|v| v.to_str().ok()),
            Some("gzip")
        );
    }

    #[actix_web::test]
    async fn every_response_carries_a_trace_id() {
        let app = actix_test::init_service(build_app(web::Data::new(http_state()))).await;

        for uri in ["/api/v1/health", "/api/v1/users", "/nowhere"] {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;

            assert!(
                response.headers().contains_key(TRACE_ID_HEADER),
                "missing trace id on {uri}"
            );
            if uri == "/nowhere" {
                assert_eq!(response.status(), StatusCode::NOT_FOUND);
            }
        }
    }
}
