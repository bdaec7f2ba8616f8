//! Relayer configuration arguments.

use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context as _, Result};
use clap::{ArgAction, Args};
use kona_relayer_core::{Config, RelayConfig, RetryPolicy};
use std::time::Duration;
use url::Url;

/// Relayer configuration arguments.
#[derive(Args, Debug, Clone)]
pub struct RelayerArgs {
    /// RPC endpoints of the chains to relay between, one per chain.
    #[arg(long = "rpc-urls", env = "RPC_URLS", value_delimiter = ',', required = true)]
    pub rpc_urls: Vec<Url>,

    /// Hex-encoded private key that signs executing transactions on every chain.
    #[arg(long = "private-key", env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: PrivateKeySigner,

    /// Maximum number of relays in flight per source chain.
    #[arg(long = "relay.max-in-flight", env = "RELAY_MAX_IN_FLIGHT", default_value_t = 16)]
    pub max_in_flight: usize,

    /// Interval between log polls, in milliseconds.
    #[arg(long = "relay.poll-interval-ms", env = "RELAY_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// How long to wait for an executing transaction to be included, in seconds.
    #[arg(
        long = "relay.confirmation-timeout-secs",
        env = "RELAY_CONFIRMATION_TIMEOUT_SECS",
        default_value_t = 120
    )]
    pub confirmation_timeout_secs: u64,

    /// How long in-flight relays may run after shutdown is requested, in seconds.
    #[arg(
        long = "relay.shutdown-grace-secs",
        env = "RELAY_SHUTDOWN_GRACE_SECS",
        default_value_t = 30
    )]
    pub shutdown_grace_secs: u64,

    /// Check each message with `validateMessage` before submitting it.
    #[arg(
        long = "relay.preflight",
        env = "RELAY_PREFLIGHT",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub preflight: bool,

    /// Number of blocks for which finished relays are remembered.
    #[arg(
        long = "relay.retention-blocks",
        env = "RELAY_RETENTION_BLOCKS",
        default_value_t = 50_000
    )]
    pub retention_blocks: u64,

    /// Total number of tries for an RPC step that fails transiently.
    #[arg(long = "retry.max-attempts", env = "RETRY_MAX_ATTEMPTS", default_value_t = 5)]
    pub retry_max_attempts: usize,

    /// Delay before the first retry, in milliseconds.
    #[arg(long = "retry.min-delay-ms", env = "RETRY_MIN_DELAY_MS", default_value_t = 250)]
    pub retry_min_delay_ms: u64,

    /// Upper bound of the delay between retries, in milliseconds.
    #[arg(long = "retry.max-delay-ms", env = "RETRY_MAX_DELAY_MS", default_value_t = 10_000)]
    pub retry_max_delay_ms: u64,
}

impl RelayerArgs {
    /// initialise and return the relayer [`Config`].
    pub fn init_config(&self) -> Result<Config> {
        let config = Config {
            rpc_urls: self.rpc_urls.clone(),
            relay: RelayConfig {
                max_in_flight: self.max_in_flight,
                poll_interval: Duration::from_millis(self.poll_interval_ms),
                confirmation_timeout: Duration::from_secs(self.confirmation_timeout_secs),
                shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
                preflight: self.preflight,
                retention_blocks: self.retention_blocks,
                retry: RetryPolicy {
                    max_attempts: self.retry_max_attempts,
                    min_delay: Duration::from_millis(self.retry_min_delay_ms),
                    max_delay: Duration::from_millis(self.retry_max_delay_ms),
                },
            },
        };
        config.validate().context("Invalid relayer configuration")?;
        Ok(config)
    }

    /// Returns the signer of executing transactions.
    pub fn signer(&self) -> PrivateKeySigner {
        self.private_key.clone()
    }
}
