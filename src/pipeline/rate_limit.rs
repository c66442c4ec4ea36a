//! Fixed-interval request pacing
//!
//! The pipeline issues at most one request at a time, so pacing is a plain
//! sleep between requests rather than a permit pool.

use crate::cancel::CancellationToken;
use std::time::Duration;
use tokio::time::sleep;

/// Sleeps a fixed interval between consecutive requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiter {
    interval: Duration,
}

impl RateLimiter {
    /// Create a limiter that waits `interval` per pause
    pub fn fixed_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Limiter that never waits
    pub fn disabled() -> Self {
        Self::fixed_interval(Duration::ZERO)
    }

    /// Configured pause length
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait one interval
    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
    }

    /// Wait one interval, returning early if `token` is cancelled
    ///
    /// # Errors
    /// Returns [`RateLimitError::Interrupted`] when cancellation is pending
    /// before or during the wait
    pub async fn pause_unless_cancelled(
        &self,
        token: &CancellationToken,
    ) -> Result<(), RateLimitError> {
        if token.is_cancelled() {
            return Err(RateLimitError::Interrupted);
        }

        tokio::select! {
            _ = self.pause() => Ok(()),
            _ = token.cancelled() => Err(RateLimitError::Interrupted),
        }
    }
}

/// Rate limiter errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// Wait cut short by cancellation
    #[error("wait interrupted by cancellation")]
    Interrupted,
}
