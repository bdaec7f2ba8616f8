//! Contains the relayer CLI.

use crate::flags::RelayerArgs;
use anyhow::{Context as _, Result};
use clap::Parser;
use kona_cli::{LogArgs, MetricsArgs, cli_styles};
use kona_relayer_core::{ChainRegistry, Relayer};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Kona's interop message relayer.
///
/// Watches the `L2ToL2CrossDomainMessenger` of every configured chain and executes each sent
/// message on its destination chain through the `CrossL2Inbox`.
#[derive(Parser, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub struct Cli {
    /// Logging arguments.
    #[command(flatten)]
    pub log: LogArgs,
    /// Prometheus CLI arguments.
    #[command(flatten)]
    pub metrics: MetricsArgs,
    /// Relayer arguments.
    #[command(flatten)]
    pub relayer: RelayerArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        // Initialize the telemetry stack.
        Self::init_stack(&self.log, &self.metrics)?;

        // Starts the relayer.
        Self::run_until_ctrl_c(|cancel| self.start(cancel))
    }

    /// Initialize the tracing stack and Prometheus metrics recorder.
    ///
    /// This function should be called at the beginning of the program.
    pub fn init_stack(log: &LogArgs, metrics: &MetricsArgs) -> Result<()> {
        log.init_tracing()?;
        metrics.init_metrics()?;
        Ok(())
    }

    /// Starts the relayer and runs it until `cancel` fires.
    pub async fn start(self, cancel: CancellationToken) -> Result<()> {
        let config = self.relayer.init_config()?;
        let registry = ChainRegistry::connect(&config.rpc_urls, self.relayer.signer(), cancel.clone())
            .await
            .context("Failed to build chain registry")?;
        info!(target: "relayer", chains = ?registry.chain_ids(), "Connected to chains");

        Relayer::new(config.relay, registry, cancel).run().await;
        Ok(())
    }

    /// Runs the future built by `start` until it completes. Ctrl-c cancels the token handed to it.
    pub fn run_until_ctrl_c<F, Fut>(start: F) -> Result<()>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let rt = Self::tokio_runtime().context("Failed to build tokio runtime")?;
        rt.block_on(async move {
            let cancel = CancellationToken::new();
            let shutdown = cancel.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!(target: "relayer", "Received ctrl-c, shutting down...");
                        shutdown.cancel();
                    }
                    Err(err) => {
                        error!(target: "relayer", %err, "Failed to listen for ctrl-c");
                    }
                }
            });
            start(cancel).await
        })
    }

    /// Creates a new default tokio multi-thread [Runtime](tokio::runtime::Runtime) with all
    /// features enabled
    pub fn tokio_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()
    }
}
