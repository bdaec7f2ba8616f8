//! A single relay attempt.

use crate::{
    AttemptLedger, DomainHandle, IdentifierBuilder, MessageKey, ReceiptTracker, RelayDispatcher,
    RelayError, RelayReceipt, metrics::Metrics,
};
use alloy_rpc_types_eth::Log;
use kona_interop::SentMessage;
use std::{sync::Arc, time::Instant};
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// The stages shared by every relay attempt.
#[derive(Debug)]
pub struct RelayContext {
    /// Builds identifiers from source logs.
    pub identifier: IdentifierBuilder,
    /// Submits executing transactions.
    pub dispatcher: RelayDispatcher,
    /// Confirms executing transactions.
    pub tracker: ReceiptTracker,
    /// Records the state of every attempt.
    pub ledger: Arc<AttemptLedger>,
}

/// Relays one sent message: identifier, dispatch, then confirmation.
#[derive(Debug)]
pub(crate) struct RelayTask {
    pub(crate) context: Arc<RelayContext>,
    pub(crate) source: Arc<DomainHandle>,
    pub(crate) key: MessageKey,
    pub(crate) log: Log,
    pub(crate) message: SentMessage,
    pub(crate) cancel: CancellationToken,
}

impl RelayTask {
    /// Runs the attempt to completion and records its outcome.
    ///
    /// The permit is held until the attempt ends.
    pub(crate) async fn run(self, _permit: OwnedSemaphorePermit) {
        let started = Instant::now();
        let destination = self.message.destination;
        match self.relay().await {
            Ok(receipt) => {
                self.context.ledger.mark_confirmed(self.key, receipt.tx_hash, receipt.block_number);
                Metrics::record_confirmed(self.source.chain_id(), destination, started.elapsed());
            }
            Err(RelayError::Cancelled) => {
                info!(target: "relayer::dispatcher", key = %self.key, "Relay cancelled before submission");
                self.context.ledger.mark_failed(self.key, RelayError::Cancelled);
                Metrics::record_failed(destination, RelayError::Cancelled.label());
            }
            Err(err) => {
                error!(
                    target: "relayer::dispatcher",
                    key = %self.key,
                    destination,
                    tx_hash = ?self.log.transaction_hash,
                    %err,
                    "Relay failed"
                );
                Metrics::record_failed(destination, err.label());
                self.context.ledger.mark_failed(self.key, err);
            }
        }
    }

    async fn relay(&self) -> Result<RelayReceipt, RelayError> {
        let identifier = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(RelayError::Cancelled),
            identifier = self.context.identifier.build(&self.source, &self.log) => identifier?,
        };
        self.context.ledger.set_identifier(self.key, identifier);

        // Cancellation is not observed once the transaction is queued.
        let pending = self
            .context
            .dispatcher
            .dispatch(
                self.message.destination,
                identifier,
                self.log.inner.data.data.clone(),
                &self.cancel,
            )
            .await?;
        self.context.ledger.mark_submitted(self.key, pending.tx_hash);

        self.context.tracker.track(&pending).await
    }
}
