//! Test utilities for the user service crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and behind the `test-support` feature.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use mockable::Clock;

use crate::domain::ports::{
    ConnectionState, DatabaseProbe, DiskReading, HostMetrics, MemoryReading, ProbeError,
    UserRepository,
};
use crate::domain::{HealthAggregator, HealthMetadata, Role, User, UserId, UserService};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::MemoryUserRepository;
use crate::outbound::security::BcryptPasswordHasher;

/// Identifier carried by [`sample_user`].
pub const SAMPLE_USER_ID: &str = "64b7f0c2a1e4d3f5b6a7c8d9";

/// Lowest cost bcrypt accepts; keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

const GIB: u64 = 1_073_741_824;

/// 2024-05-01T12:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_714_564_800, 0).unwrap_or_default()
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Clock that always reads `at`.
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(fixed_now())
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Stored user fixture.
#[expect(clippy::expect_used, reason = "fixture identifier is a valid literal")]
pub fn sample_user() -> User {
    User {
        id: UserId::new(SAMPLE_USER_ID).expect("sample id is 24 hex characters"),
        name: "Ada Lovelace".to_owned(),
        email: "ada@example.com".to_owned(),
        role: Role::User,
        created_at: fixed_now(),
    }
}

/// Database probe reporting a fixed state and a successful ping.
#[derive(Debug, Clone, Copy)]
pub struct StaticDatabaseProbe(pub ConnectionState);

#[async_trait]
impl DatabaseProbe for StaticDatabaseProbe {
    fn connection_state(&self) -> ConnectionState {
        self.0
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        Ok(())
    }
}

/// Host metrics returning canned readings.
#[derive(Debug, Clone)]
pub struct StaticHostMetrics {
    /// CPU load percentage.
    pub cpu_load: f64,
    /// Logical cores.
    pub cpu_cores: usize,
    /// Memory totals.
    pub memory: MemoryReading,
    /// Volumes, primary first.
    pub disks: Vec<DiskReading>,
}

impl Default for StaticHostMetrics {
    /// A comfortably healthy host.
    fn default() -> Self {
        Self {
            cpu_load: 12.5,
            cpu_cores: 8,
            memory: MemoryReading {
                total: 16 * GIB,
                available: 8 * GIB,
                used: 8 * GIB,
            },
            disks: vec![DiskReading {
                total: 512 * GIB,
                available: 256 * GIB,
                used: 256 * GIB,
            }],
        }
    }
}

#[async_trait]
impl HostMetrics for StaticHostMetrics {
    async fn cpu_load(&self) -> Result<f64, ProbeError> {
        Ok(self.cpu_load)
    }

    async fn cpu_cores(&self) -> Result<usize, ProbeError> {
        Ok(self.cpu_cores)
    }

    async fn memory(&self) -> Result<MemoryReading, ProbeError> {
        Ok(self.memory)
    }

    async fn disks(&self) -> Result<Vec<DiskReading>, ProbeError> {
        Ok(self.disks.clone())
    }
}

/// Health aggregator over static probes.
pub fn health_aggregator(database: ConnectionState, host: StaticHostMetrics) -> HealthAggregator {
    HealthAggregator::new(
        Arc::new(StaticDatabaseProbe(database)),
        Arc::new(host),
        Arc::new(FixedClock::default()),
        HealthMetadata::new("users", "localhost:27017", "development"),
    )
}

/// HTTP state over `repository`, a fast bcrypt hasher, and a healthy host.
pub fn http_state_with(repository: Arc<dyn UserRepository>) -> HttpState {
    HttpState::new(
        Arc::new(UserService::new(
            repository,
            Arc::new(BcryptPasswordHasher::new(TEST_BCRYPT_COST)),
        )),
        Arc::new(health_aggregator(
            ConnectionState::Connected,
            StaticHostMetrics::default(),
        )),
    )
}

/// HTTP state over an empty in-memory repository.
pub fn http_state() -> HttpState {
    http_state_with(Arc::new(MemoryUserRepository::new(Arc::new(
        FixedClock::default(),
    ))))
}
