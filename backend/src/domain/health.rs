//! Health aggregation over independent status probes.
//!
//! [`HealthAggregator::report`] fans out to the database and host probes
//! concurrently and always produces a report. A probe that fails is logged
//! and replaced with a zeroed reading, which usually tips the verdict to
//! unhealthy without naming the subsystem in the response.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use tracing::warn;

use crate::domain::ports::{
    ConnectionState, DatabaseProbe, DiskReading, HostMetrics, MemoryReading, ProbeError,
};

/// CPU load at or above this percentage is unhealthy.
pub const CPU_LOAD_LIMIT: f64 = 90.0;
/// Available memory must exceed this many bytes.
pub const AVAILABLE_MEMORY_FLOOR: u64 = 1_000_000_000;
/// Upper bound on the database ping.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);

const HEALTHY_MESSAGE: &str = "System is healthy";
const UNHEALTHY_MESSAGE: &str = "System health check detected issues";
const FRAMEWORK_NAME: &str = "actix-web";
const FRAMEWORK_VERSION: &str = "4";

/// Overall verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every check passed.
    Healthy,
    /// At least one check failed.
    Unhealthy,
}

impl HealthStatus {
    /// Generic message reported alongside the verdict.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Healthy => HEALTHY_MESSAGE,
            Self::Unhealthy => UNHEALTHY_MESSAGE,
        }
    }
}

/// Decide the verdict from the three gating readings.
///
/// # Examples
/// ```
/// use user_service::domain::health::{verdict, HealthStatus};
/// use user_service::domain::ports::ConnectionState;
///
/// assert_eq!(
///     verdict(ConnectionState::Connected, 89.9, 1_000_000_001),
///     HealthStatus::Healthy
/// );
/// assert_eq!(
///     verdict(ConnectionState::Connected, 90.0, 1_000_000_001),
///     HealthStatus::Unhealthy
/// );
/// ```
pub fn verdict(state: ConnectionState, cpu_load: f64, available_memory: u64) -> HealthStatus {
    if state == ConnectionState::Connected
        && cpu_load < CPU_LOAD_LIMIT
        && available_memory > AVAILABLE_MEMORY_FLOOR
    {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    }
}

/// `part / whole` as a percentage with two decimals; zero when `whole` is
/// zero.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss, reason = "byte counts fit f64 for display")]
    let ratio = part as f64 / whole as f64;
    round2(ratio * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// CPU section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuSnapshot {
    /// Load percentage.
    pub usage: f64,
    /// Logical cores.
    pub cores: usize,
}

/// Memory or disk section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    /// Capacity in bytes.
    pub total: u64,
    /// Available bytes.
    pub free: u64,
    /// Bytes in use.
    pub used: u64,
    /// `used / total` as a percentage.
    pub used_percent: f64,
}

impl UsageSnapshot {
    fn new(total: u64, free: u64, used: u64) -> Self {
        Self {
            total,
            free,
            used,
            used_percent: percentage(used, total),
        }
    }
}

impl From<MemoryReading> for UsageSnapshot {
    fn from(reading: MemoryReading) -> Self {
        Self::new(reading.total, reading.available, reading.used)
    }
}

impl From<DiskReading> for UsageSnapshot {
    fn from(reading: DiskReading) -> Self {
        Self::new(reading.total, reading.available, reading.used)
    }
}

/// Host section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    /// CPU readings.
    pub cpu: CpuSnapshot,
    /// Memory readings.
    pub memory: UsageSnapshot,
    /// Primary volume readings.
    pub disk: UsageSnapshot,
}

/// Database section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseSnapshot {
    /// Database name.
    pub name: String,
    /// Host the client points at.
    pub host: String,
    /// Numeric connection state.
    pub state: u8,
    /// Label for `state`.
    pub status: &'static str,
    /// Ping latency in milliseconds, absent when no ping succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
}

/// Static framework metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkInfo {
    /// HTTP framework.
    pub name: &'static str,
    /// Framework major version.
    pub version: &'static str,
    /// Minimum supported compiler version.
    pub runtime_version: &'static str,
}

impl Default for FrameworkInfo {
    fn default() -> Self {
        Self {
            name: FRAMEWORK_NAME,
            version: FRAMEWORK_VERSION,
            runtime_version: env!("CARGO_PKG_RUST_VERSION"),
        }
    }
}

/// Application metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationInfo {
    /// Deployment environment.
    pub environment: String,
    /// Package version.
    pub version: String,
    /// Build identifier.
    pub build: String,
}

/// Computed health document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// Overall verdict.
    pub status: HealthStatus,
    /// Generic verdict message.
    pub message: &'static str,
    /// Server time at collection.
    pub timestamp: DateTime<Utc>,
    /// Process uptime in seconds.
    pub uptime: f64,
    /// Host readings.
    pub system: SystemSnapshot,
    /// Database readings.
    pub database: DatabaseSnapshot,
    /// Framework metadata.
    pub framework: FrameworkInfo,
    /// Application metadata.
    pub application: ApplicationInfo,
}

/// Static values echoed into every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthMetadata {
    /// Database name.
    pub database_name: String,
    /// Database host.
    pub database_host: String,
    /// Deployment environment label.
    pub environment: String,
    /// Application version.
    pub version: String,
    /// Build identifier.
    pub build: String,
    /// Process start; uptime is measured from here.
    pub started_at: Instant,
}

impl HealthMetadata {
    /// Metadata with the package version and the `APP_BUILD` value baked in
    /// at compile time.
    pub fn new(
        database_name: impl Into<String>,
        database_host: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            database_name: database_name.into(),
            database_host: database_host.into(),
            environment: environment.into(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            build: option_env!("APP_BUILD").unwrap_or("unknown").to_owned(),
            started_at: Instant::now(),
        }
    }

    /// Measure uptime from `started_at` rather than from construction.
    #[must_use]
    pub const fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }
}

fn or_default<T: Default>(probe: &'static str, reading: Result<T, ProbeError>) -> T {
    reading.unwrap_or_else(|error| {
        warn!(probe, %error, "health probe failed");
        T::default()
    })
}

/// Collects [`HealthReport`]s.
#[derive(Clone)]
pub struct HealthAggregator {
    database: Arc<dyn DatabaseProbe>,
    host: Arc<dyn HostMetrics>,
    clock: Arc<dyn Clock>,
    metadata: HealthMetadata,
    ping_timeout: Duration,
}

impl HealthAggregator {
    /// Build an aggregator; uptime is measured from
    /// [`HealthMetadata::started_at`].
    pub fn new(
        database: Arc<dyn DatabaseProbe>,
        host: Arc<dyn HostMetrics>,
        clock: Arc<dyn Clock>,
        metadata: HealthMetadata,
    ) -> Self {
        Self {
            database,
            host,
            clock,
            metadata,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }

    /// Override the ping bound.
    #[must_use]
    pub const fn with_ping_timeout(mut self, ping_timeout: Duration) -> Self {
        self.ping_timeout = ping_timeout;
        self
    }

    async fn database_snapshot(&self) -> DatabaseSnapshot {
        let state = self.database.connection_state();
        let response_time = if state == ConnectionState::Connected {
            self.ping_latency().await
        } else {
            None
        };
        DatabaseSnapshot {
            name: self.metadata.database_name.clone(),
            host: self.metadata.database_host.clone(),
            state: state.code(),
            status: state.label(),
            response_time,
        }
    }

    async fn ping_latency(&self) -> Option<u64> {
        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.ping_timeout, self.database.ping()).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::TimedOut {
                millis: u64::try_from(self.ping_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        match outcome {
            Ok(()) => Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
            Err(error) => {
                warn!(%error, "database ping failed");
                None
            }
        }
    }

    /// Gather every probe and compute the verdict. Never fails.
    pub async fn report(&self) -> HealthReport {
        let (database, cpu_load, cpu_cores, memory, disks) = tokio::join!(
            self.database_snapshot(),
            self.host.cpu_load(),
            self.host.cpu_cores(),
            self.host.memory(),
            self.host.disks(),
        );

        let cpu_load = or_default("cpu_load", cpu_load);
        let cpu_cores = or_default("cpu_cores", cpu_cores);
        let memory = or_default("memory", memory);
        let disk = or_default("disks", disks)
            .into_iter()
            .next()
            .unwrap_or_default();

        let status = verdict(
            ConnectionState::from_code(database.state),
            cpu_load,
            memory.available,
        );

        HealthReport {
            status,
            message: status.message(),
            timestamp: self.clock.utc(),
            uptime: self.metadata.started_at.elapsed().as_secs_f64(),
            system: SystemSnapshot {
                cpu: CpuSnapshot {
                    usage: round2(cpu_load),
                    cores: cpu_cores,
                },
                memory: memory.into(),
                disk: disk.into(),
            },
            database,
            framework: FrameworkInfo::default(),
            application: ApplicationInfo {
                environment: self.metadata.environment.clone(),
                version: self.metadata.version.clone(),
                build: self.metadata.build.clone(),
            },
        }
    }
}
