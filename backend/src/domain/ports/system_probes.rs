//! Driven ports read by the health aggregator.
//!
//! Each probe is independent: a failure in one must never stop the others
//! from reporting, so every method returns its own [`ProbeError`].

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by status probes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The subsystem could not be read.
    #[error("probe unavailable: {message}")]
    Unavailable { message: String },
    /// The probe did not answer in time.
    #[error("probe timed out after {millis} ms")]
    TimedOut { millis: u64 },
}

impl ProbeError {
    /// Helper for unreadable subsystems.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Document store connection lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No usable connection.
    #[default]
    Disconnected,
    /// Connected and serving queries.
    Connected,
    /// Connection attempt in progress.
    Connecting,
    /// Shutdown in progress.
    Disconnecting,
}

impl ConnectionState {
    /// Numeric state reported in the health document.
    pub const fn code(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connected => 1,
            Self::Connecting => 2,
            Self::Disconnecting => 3,
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnecting => "disconnecting",
        }
    }

    /// Inverse of [`ConnectionState::code`]; unknown codes read as
    /// disconnected.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Connected,
            2 => Self::Connecting,
            3 => Self::Disconnecting,
            _ => Self::Disconnected,
        }
    }
}

/// Database status probe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Current connection state; never blocks.
    fn connection_state(&self) -> ConnectionState;

    /// Lightweight round trip to the server.
    async fn ping(&self) -> Result<(), ProbeError>;
}

/// Memory totals in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryReading {
    /// Installed memory.
    pub total: u64,
    /// Memory available for new allocations.
    pub available: u64,
    /// Memory in use.
    pub used: u64,
}

/// Volume usage in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskReading {
    /// Volume size.
    pub total: u64,
    /// Space available to the process.
    pub available: u64,
    /// Space in use.
    pub used: u64,
}

/// Host metrics probe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostMetrics: Send + Sync {
    /// Current CPU load as a percentage across all cores.
    async fn cpu_load(&self) -> Result<f64, ProbeError>;

    /// Logical core count.
    async fn cpu_cores(&self) -> Result<usize, ProbeError>;

    /// Memory totals.
    async fn memory(&self) -> Result<MemoryReading, ProbeError>;

    /// Mounted volumes; the first entry is the primary volume.
    async fn disks(&self) -> Result<Vec<DiskReading>, ProbeError>;
}
