//! Startup connection loop for the document store.
//!
//! The loop is an explicit state machine: each failed attempt either moves
//! to the next [`BootstrapState::Attempting`] after a fixed delay or, once
//! the retry budget is spent, lands in [`BootstrapState::Failed`]. The
//! caller decides what failure means; the server binary exits.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use super::client::{ConnectionTracker, StoreError};
use crate::domain::ports::ConnectionState;

/// Retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Bounds on the connection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one fails.
    pub max_retries: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Position in the connection loop. Attempts are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// About to run attempt `attempt`.
    Attempting { attempt: u32 },
    /// A connection was established.
    Connected,
    /// Every attempt failed.
    Failed { attempts: u32 },
}

impl BootstrapState {
    /// Starting state.
    pub const fn start() -> Self {
        Self::Attempting { attempt: 1 }
    }

    /// Transition after the current attempt finishes.
    ///
    /// ```
    /// use user_service::outbound::persistence::{BootstrapState, RetryPolicy};
    ///
    /// let policy = RetryPolicy::default();
    /// let state = BootstrapState::Attempting { attempt: 6 };
    /// assert_eq!(state.next(false, policy), BootstrapState::Failed { attempts: 6 });
    /// assert_eq!(state.next(true, policy), BootstrapState::Connected);
    /// ```
    #[must_use]
    pub const fn next(self, succeeded: bool, policy: RetryPolicy) -> Self {
        match self {
            Self::Attempting { .. } if succeeded => Self::Connected,
            Self::Attempting { attempt } if attempt > policy.max_retries => {
                Self::Failed { attempts: attempt }
            }
            Self::Attempting { attempt } => Self::Attempting {
                attempt: attempt.saturating_add(1),
            },
            terminal => terminal,
        }
    }
}

/// Suspends the loop between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The loop gave up.
#[derive(Debug, Error)]
#[error("could not connect to MongoDB after {attempts} attempts: {last}")]
pub struct BootstrapError {
    /// Attempts made.
    pub attempts: u32,
    /// Failure from the final attempt.
    #[source]
    pub last: StoreError,
}

/// Run `connect` until it succeeds or `policy` is exhausted, publishing
/// each transition to `tracker`.
///
/// # Errors
///
/// Returns [`BootstrapError`] carrying the last failure once every attempt
/// has failed.
pub async fn connect_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    tracker: &ConnectionTracker,
    mut connect: F,
) -> Result<T, BootstrapError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut state = BootstrapState::start();
    while let BootstrapState::Attempting { attempt } = state {
        tracker.set(ConnectionState::Connecting);
        info!(attempt, "connecting to MongoDB");
        let failure = match connect().await {
            Ok(connected) => {
                tracker.set(ConnectionState::Connected);
                info!(attempt, "MongoDB connected");
                return Ok(connected);
            }
            Err(failure) => failure,
        };
        tracker.set(ConnectionState::Disconnected);

        state = state.next(false, policy);
        if let BootstrapState::Attempting { .. } = state {
            warn!(
                attempt,
                error = %failure,
                retry_in_ms = u64::try_from(policy.delay.as_millis()).unwrap_or(u64::MAX),
                "MongoDB connection failed; retrying"
            );
            sleeper.sleep(policy.delay).await;
        } else {
            error!(attempts = attempt, error = %failure, "MongoDB connection retries exhausted");
            return Err(BootstrapError {
                attempts: attempt,
                last: failure,
            });
        }
    }
    Err(BootstrapError {
        attempts: 0,
        last: StoreError::unreachable("connection loop started in a terminal state"),
    })
}
