//! Builders wiring outbound adapters into the HTTP state.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use mockable::{Clock, DefaultClock};
use tracing::info;

use user_service::config::ServiceConfig;
use user_service::domain::{HealthAggregator, HealthMetadata, UserService};
use user_service::example_data::seed_example_data_on_startup;
use user_service::inbound::http::state::HttpState;
use user_service::outbound::host::SysinfoHostMetrics;
use user_service::outbound::persistence::{
    ConnectionTracker, MongoStore, MongoUserRepository, RetryPolicy, StoreConfig, TokioSleeper,
    connect_with_retry,
};
use user_service::outbound::security::BcryptPasswordHasher;

/// Connect to MongoDB, retrying per [`RetryPolicy::default`].
///
/// # Errors
/// Returns [`io::Error`] once every attempt has failed.
pub async fn connect_store(config: &ServiceConfig) -> io::Result<MongoStore> {
    let uri = config.mongo.uri();
    let store_config = StoreConfig::new(uri.as_str(), config.mongo.database.as_str());
    let tracker = ConnectionTracker::default();
    connect_with_retry(RetryPolicy::default(), &TokioSleeper, &tracker, || {
        MongoStore::connect(&store_config, tracker.clone())
    })
    .await
    .map_err(io::Error::other)
}

/// Prepare the users collection and assemble handler dependencies.
///
/// Health uptime is reported relative to `started_at`.
///
/// # Errors
/// Returns [`io::Error`] when the email index cannot be created or example
/// data seeding fails.
pub async fn build_http_state(
    config: &ServiceConfig,
    store: &MongoStore,
    started_at: Instant,
) -> io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let repository = Arc::new(MongoUserRepository::new(store.database(), clock.clone()));
    repository.ensure_indexes().await.map_err(io::Error::other)?;
    info!("users email index ensured");

    let hasher = Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost));
    seed_example_data_on_startup(
        config.seed_example_users,
        repository.clone(),
        hasher.clone(),
    )
    .await
    .map_err(io::Error::other)?;

    let health = HealthAggregator::new(
        Arc::new(store.probe()),
        Arc::new(SysinfoHostMetrics),
        clock,
        HealthMetadata::new(
            config.mongo.database.as_str(),
            config.mongo.path.as_str(),
            config.environment.as_str(),
        )
        .with_started_at(started_at),
    );

    Ok(HttpState::new(
        Arc::new(UserService::new(repository, hasher)),
        Arc::new(health),
    ))
}
