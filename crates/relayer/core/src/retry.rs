//! Bounded exponential backoff for transient RPC failures.

use crate::RelayError;
use backon::{ExponentialBuilder, Retryable};
use std::{future::Future, time::Duration};
use tracing::warn;

/// Backoff applied to RPC steps that fail with a transient [`RelayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of tries, including the first one.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Upper bound of the delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Returns the bounded backoff of the policy.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1))
            .with_jitter()
    }

    /// Returns a backoff with the same delays that never gives up.
    pub fn unbounded(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(usize::MAX)
    }

    /// Runs `op`, retrying it while it fails with a transient error.
    ///
    /// Permanent errors and the last transient error are returned as is.
    pub async fn run<T, F, Fut>(&self, step: &'static str, op: F) -> Result<T, RelayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RelayError>>,
    {
        op.retry(self.backoff())
            .when(RelayError::is_transient)
            .notify(|err, delay| {
                warn!(target: "relayer::retry", step, %err, ?delay, "Retrying after transient failure");
            })
            .await
    }
}
