//! MongoDB client construction, connection tracking, and the database
//! health probe.
//!
//! The driver connects lazily, so [`MongoStore::connect`] issues a `ping`
//! before reporting success. Connection state lives in a shared
//! [`ConnectionTracker`] that the health probe reads without blocking. After
//! startup the driver's topology events keep the tracker current, so a lost
//! server shows up as `disconnected` until a heartbeat finds it again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::event::EventHandler;
use mongodb::event::sdam::SdamEvent;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database, ServerType};
use tracing::{info, warn};

use crate::domain::ports::{ConnectionState, DatabaseProbe, ProbeError};

/// Errors that can occur while establishing the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Connection string or options were rejected.
    #[error("invalid MongoDB client options: {message}")]
    Options { message: String },

    /// The server did not answer the initial ping.
    #[error("MongoDB server unreachable: {message}")]
    Unreachable { message: String },
}

impl StoreError {
    /// Create an options error with the given message.
    pub fn options(message: impl Into<String>) -> Self {
        Self::Options {
            message: message.into(),
        }
    }

    /// Create an unreachable error with the given message.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }
}

/// Configuration for the MongoDB client.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use user_service::outbound::persistence::StoreConfig;
///
/// let config = StoreConfig::new("mongodb://localhost:27017", "users")
///     .with_max_pool_size(20)
///     .with_connect_timeout(Duration::from_secs(3));
/// assert_eq!(config.database(), "users");
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    uri: String,
    database: String,
    max_pool_size: u32,
    server_selection_timeout: Duration,
    connect_timeout: Duration,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("uri", &"<redacted>")
            .field("database", &self.database)
            .field("max_pool_size", &self.max_pool_size)
            .field("server_selection_timeout", &self.server_selection_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Create a new configuration with the given connection string.
    ///
    /// Defaults:
    /// - `max_pool_size`: 10 connections
    /// - `server_selection_timeout`: 5 seconds
    /// - `connect_timeout`: 10 seconds
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            max_pool_size: 10,
            server_selection_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set the maximum number of pooled connections.
    #[must_use]
    pub const fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self
    }

    /// Set how long server selection may take.
    #[must_use]
    pub const fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = timeout;
        self
    }

    /// Set the socket connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Database name.
    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Shared, lock-free connection state.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker(Arc<AtomicU8>);

impl ConnectionTracker {
    /// Tracker starting in `state`.
    pub fn new(state: ConnectionState) -> Self {
        Self(Arc::new(AtomicU8::new(state.code())))
    }

    /// Record a transition.
    pub fn set(&self, state: ConnectionState) {
        self.0.store(state.code(), Ordering::Release);
    }

    /// Current state.
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_code(self.0.load(Ordering::Acquire))
    }

    /// Fold a reachability observation from the driver into the state.
    ///
    /// Flips between `connected` and `disconnected` and logs each change.
    /// Observations arriving while the store is shutting down are ignored.
    ///
    /// Returns the state that was replaced, if any.
    pub fn observe(&self, reachable: bool) -> Option<ConnectionState> {
        let next = if reachable {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        let previous = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |code| {
                let current = ConnectionState::from_code(code);
                (current != next && current != ConnectionState::Disconnecting)
                    .then_some(next.code())
            })
            .ok()
            .map(ConnectionState::from_code)?;
        if reachable {
            info!(previous = previous.label(), "MongoDB connection established");
        } else {
            warn!(previous = previous.label(), "MongoDB disconnected");
        }
        Some(previous)
    }

    /// Driver event handler feeding [`ConnectionTracker::observe`].
    ///
    /// The store counts as reachable while any known server has a type
    /// other than `Unknown`; the driver demotes a server to `Unknown` when
    /// its heartbeat fails.
    fn sdam_handler(&self) -> EventHandler<SdamEvent> {
        let tracker = self.clone();
        EventHandler::callback(move |event: SdamEvent| match event {
            SdamEvent::TopologyDescriptionChanged(change) => {
                let reachable = change
                    .new_description
                    .servers()
                    .values()
                    .any(|server| !matches!(server.server_type(), ServerType::Unknown));
                tracker.observe(reachable);
            }
            SdamEvent::ServerHeartbeatFailed(failed) => {
                warn!(
                    server = %failed.server_address,
                    error = %failed.failure,
                    "MongoDB heartbeat failed"
                );
            }
            _ => {}
        })
    }
}

/// Connected MongoDB client plus its tracker.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    tracker: ConnectionTracker,
}

impl MongoStore {
    /// Build the client and confirm the server answers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Options`] for malformed configuration and
    /// [`StoreError::Unreachable`] when the ping fails.
    pub async fn connect(
        config: &StoreConfig,
        tracker: ConnectionTracker,
    ) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|err| StoreError::options(err.to_string()))?;
        options.max_pool_size = Some(config.max_pool_size);
        options.server_selection_timeout = Some(config.server_selection_timeout);
        options.connect_timeout = Some(config.connect_timeout);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_owned());
        options.sdam_event_handler = Some(tracker.sdam_handler());

        let client =
            Client::with_options(options).map_err(|err| StoreError::options(err.to_string()))?;
        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| StoreError::unreachable(err.to_string()))?;

        tracker.set(ConnectionState::Connected);
        Ok(Self {
            client,
            database,
            tracker,
        })
    }

    /// Handle to the configured database.
    pub fn database(&self) -> Database {
        self.database.clone()
    }

    /// Shared connection tracker.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Health probe over this client.
    pub fn probe(&self) -> MongoDatabaseProbe {
        MongoDatabaseProbe {
            database: self.database.clone(),
            tracker: self.tracker.clone(),
        }
    }

    /// Close every pooled connection, tracking the transition.
    pub async fn shutdown(self) {
        self.tracker.set(ConnectionState::Disconnecting);
        self.client.shutdown().await;
        self.tracker.set(ConnectionState::Disconnected);
        info!("MongoDB connection closed");
    }
}

/// [`DatabaseProbe`] backed by the live client.
#[derive(Clone)]
pub struct MongoDatabaseProbe {
    database: Database,
    tracker: ConnectionTracker,
}

#[async_trait]
impl DatabaseProbe for MongoDatabaseProbe {
    fn connection_state(&self) -> ConnectionState {
        self.tracker.get()
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(drop)
            .map_err(|err| ProbeError::unavailable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn store_config_default_values() {
        let config = StoreConfig::new("mongodb://localhost:27017", "test");

        assert_eq!(config.database(), "test");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.server_selection_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[rstest]
    fn store_config_builder_pattern() {
        let config = StoreConfig::new("mongodb://localhost:27017", "test")
            .with_max_pool_size(20)
            .with_server_selection_timeout(Duration::from_secs(1))
            .with_connect_timeout(Duration::from_secs(2));

        assert_eq!(config.max_pool_size, 20);
        assert_eq!(config.server_selection_timeout, Duration::from_secs(1));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
    }

    #[rstest]
    fn store_config_debug_hides_uri() {
        let config = StoreConfig::new("mongodb://root:hunter2@db:27017", "test");

        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[rstest]
    fn tracker_shares_state_between_clones() {
        let tracker = ConnectionTracker::new(ConnectionState::Connecting);
        let observer = tracker.clone();

        tracker.set(ConnectionState::Connected);

        assert_eq!(observer.get(), ConnectionState::Connected);
    }

    #[rstest]
    #[case::lost(ConnectionState::Connected, false, ConnectionState::Disconnected)]
    #[case::recovered(ConnectionState::Disconnected, true, ConnectionState::Connected)]
    #[case::first_contact(ConnectionState::Connecting, true, ConnectionState::Connected)]
    #[case::unreachable_while_connecting(
        ConnectionState::Connecting,
        false,
        ConnectionState::Disconnected
    )]
    fn observations_move_the_state(
        #[case] initial: ConnectionState,
        #[case] reachable: bool,
        #[case] expected: ConnectionState,
    ) {
        let tracker = ConnectionTracker::new(initial);

        let previous = tracker.observe(reachable);

        assert_eq!(previous, Some(initial));
        assert_eq!(tracker.get(), expected);
    }

    #[rstest]
    #[case(ConnectionState::Connected, true)]
    #[case(ConnectionState::Disconnected, false)]
    fn repeated_observations_are_quiet(#[case] state: ConnectionState, #[case] reachable: bool) {
        let tracker = ConnectionTracker::new(state);

        assert_eq!(tracker.observe(reachable), None);
        assert_eq!(tracker.get(), state);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn shutdown_is_not_overridden(#[case] reachable: bool) {
        let tracker = ConnectionTracker::new(ConnectionState::Disconnecting);

        assert_eq!(tracker.observe(reachable), None);
        assert_eq!(tracker.get(), ConnectionState::Disconnecting);
    }

    #[rstest]
    fn observations_are_visible_to_clones() {
        let tracker = ConnectionTracker::new(ConnectionState::Connected);
        let probe_side = tracker.clone();

        tracker.observe(false);

        assert_eq!(probe_side.get(), ConnectionState::Disconnected);
    }

    #[rstest]
    fn tracker_defaults_to_disconnected() {
        assert_eq!(
            ConnectionTracker::default().get(),
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn malformed_uri_is_an_options_error() {
        let config = StoreConfig::new("not-a-mongodb-uri", "test");

        let result = MongoStore::connect(&config, ConnectionTracker::default()).await;

        assert!(matches!(result, Err(StoreError::Options { .. })));
    }
}
