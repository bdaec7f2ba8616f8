//! The relayer service.

use crate::{
    AttemptLedger, ChainRegistry, ChainRelayer, IdentifierBuilder, ReceiptTracker, RelayConfig,
    RelayDispatcher, metrics::Metrics, task::RelayContext,
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Relays messages between every pair of chains in a [`ChainRegistry`].
///
/// Runs one [`ChainRelayer`] per registered chain. Each chain is both a source, watched for sent
/// messages, and a destination for messages sent from the others.
#[derive(Debug)]
pub struct Relayer {
    config: RelayConfig,
    registry: Arc<ChainRegistry>,
    ledger: Arc<AttemptLedger>,
    cancel: CancellationToken,
}

impl Relayer {
    /// Creates a new [`Relayer`].
    pub fn new(config: RelayConfig, registry: ChainRegistry, cancel: CancellationToken) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
            ledger: Arc::new(AttemptLedger::default()),
            cancel,
        }
    }

    /// Returns the ledger of relay attempts.
    pub fn ledger(&self) -> Arc<AttemptLedger> {
        self.ledger.clone()
    }

    /// Runs until the cancellation token fires and every chain relayer has shut down.
    pub async fn run(self) {
        let chain_ids = self.registry.chain_ids();
        Metrics::init(&chain_ids);

        let context = Arc::new(RelayContext {
            identifier: IdentifierBuilder::new(self.config.retry),
            dispatcher: RelayDispatcher::new(
                self.registry.clone(),
                self.config.preflight,
                self.config.retry,
            ),
            tracker: ReceiptTracker::new(self.config.confirmation_timeout, self.config.retry),
            ledger: self.ledger.clone(),
        });

        let mut relayers = JoinSet::new();
        for source in self.registry.domains() {
            let relayer =
                ChainRelayer::new(source.clone(), context.clone(), &self.config, self.cancel.clone());
            relayers.spawn(relayer.run());
        }
        info!(target: "relayer", chains = ?chain_ids, "Relayer started");

        while let Some(result) = relayers.join_next().await {
            if let Err(err) = result {
                error!(target: "relayer", %err, "Chain relayer task failed");
            }
        }
        info!(target: "relayer", "Relayer stopped");
    }
}
