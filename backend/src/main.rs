//! Service entry-point: loads configuration, connects MongoDB, and serves
//! the REST API until the process is asked to stop.

mod server;

use std::time::Instant;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use user_service::config::ServiceConfig;

use server::{ServerConfig, build_http_state, connect_store, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let started_at = Instant::now();
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServiceConfig::load().map_err(|err| {
        error!(error = %err, "configuration rejected");
        std::io::Error::other(err)
    })?;

    let store = connect_store(&config).await?;
    let http_state = match build_http_state(&config, &store, started_at).await {
        Ok(state) => state,
        Err(err) => {
            error!(error = %err, "startup failed");
            store.shutdown().await;
            return Err(err);
        }
    };

    let server = create_server(http_state, ServerConfig::from(&config))?;
    info!(
        port = config.port,
        environment = config.environment.as_str(),
        "App listening"
    );
    let outcome = server.await;
    store.shutdown().await;
    outcome
}
