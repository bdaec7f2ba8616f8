//! Runtime configuration of the relayer.

use crate::RetryPolicy;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Configuration of a [`Relayer`](crate::Relayer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// One RPC endpoint per chain in the interop set.
    pub rpc_urls: Vec<Url>,
    /// Tuning of the relay pipeline.
    pub relay: RelayConfig,
}

impl Config {
    /// Checks the configuration for values the relayer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_urls.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        self.relay.validate()
    }
}

/// Tuning of the relay pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Maximum number of relay attempts in flight per source chain.
    pub max_in_flight: usize,
    /// Interval between log polls on each source chain.
    pub poll_interval: Duration,
    /// How long to wait for an executing transaction to be included.
    pub confirmation_timeout: Duration,
    /// How long in-flight attempts may run after shutdown is requested.
    pub shutdown_grace: Duration,
    /// Whether to check each message with `validateMessage` before submitting it.
    pub preflight: bool,
    /// Number of blocks behind the latest observed one for which finished attempts are kept.
    pub retention_blocks: u64,
    /// Backoff applied to transient RPC failures.
    pub retry: RetryPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 16,
            poll_interval: Duration::from_secs(1),
            confirmation_timeout: Duration::from_secs(120),
            shutdown_grace: Duration::from_secs(30),
            preflight: true,
            retention_blocks: 50_000,
            retry: RetryPolicy::default(),
        }
    }
}

impl RelayConfig {
    /// Checks the pipeline tuning.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.max_in_flight == 0 {
            return Err(ConfigError::ZeroInFlight);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.retry.min_delay.as_nanos() > self.retry.max_delay.as_nanos() {
            return Err(ConfigError::InvalidBackoff {
                min: self.retry.min_delay,
                max: self.retry.max_delay,
            });
        }
        Ok(())
    }
}

/// An invalid relayer configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No RPC endpoints were configured.
    #[error("at least one rpc url is required")]
    NoEndpoints,
    /// The in-flight limit is zero.
    #[error("max in-flight relays must be greater than zero")]
    ZeroInFlight,
    /// The retry policy allows no attempts.
    #[error("retry attempts must be greater than zero")]
    ZeroAttempts,
    /// The minimum retry delay exceeds the maximum.
    #[error("minimum retry delay {min:?} exceeds maximum {max:?}")]
    InvalidBackoff {
        /// The configured minimum delay.
        min: Duration,
        /// The configured maximum delay.
        max: Duration,
    },
}
