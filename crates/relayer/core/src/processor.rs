//! Relay loop of one source chain.

use crate::{
    DomainHandle, EventLogger, EventWatcher, MessageDecoder, MessageKey, RelayConfig, RelayError,
    metrics::Metrics,
    task::{RelayContext, RelayTask},
};
use alloy_primitives::ChainId;
use alloy_rpc_types_eth::Log;
use std::{sync::Arc, time::Duration};
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Watches one source chain and relays every message sent from it.
///
/// Each message is relayed by its own task. At most `max_in_flight` tasks run at once; when the
/// limit is reached the chain relayer stops reading logs until a task finishes.
#[derive(Debug)]
pub struct ChainRelayer {
    source: Arc<DomainHandle>,
    watcher: EventWatcher,
    decoder: MessageDecoder,
    events: EventLogger,
    context: Arc<RelayContext>,
    permits: Arc<Semaphore>,
    tasks: JoinSet<()>,
    shutdown_grace: Duration,
    retention_blocks: u64,
    cancel: CancellationToken,
}

impl ChainRelayer {
    /// Creates a relayer for messages sent from `source`.
    pub fn new(
        source: Arc<DomainHandle>,
        context: Arc<RelayContext>,
        config: &RelayConfig,
        cancel: CancellationToken,
    ) -> Self {
        let chain_id = source.chain_id();
        Self {
            watcher: EventWatcher::new(source.clone(), config.poll_interval, config.retry),
            decoder: MessageDecoder::new(chain_id),
            events: EventLogger::new(chain_id),
            source,
            context,
            permits: Arc::new(Semaphore::new(config.max_in_flight)),
            tasks: JoinSet::new(),
            shutdown_grace: config.shutdown_grace,
            retention_blocks: config.retention_blocks,
            cancel,
        }
    }

    /// Returns the source chain id.
    pub fn chain_id(&self) -> ChainId {
        self.source.chain_id()
    }

    /// Runs until cancelled, then waits for in-flight attempts.
    pub async fn run(mut self) {
        info!(target: "relayer::watcher", chain_id = self.chain_id(), "Starting chain relayer");
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(target: "relayer::watcher", chain_id = self.chain_id(), "Chain relayer cancellation requested, stopping...");
                    break;
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(err) = joined {
                        error!(target: "relayer::dispatcher", chain_id = self.chain_id(), %err, "Relay task panicked");
                    }
                }
                batch = self.watcher.next_batch() => {
                    self.handle_batch(batch).await;
                }
            }
        }
        self.drain().await;
    }

    async fn handle_batch(&mut self, batch: Vec<Log>) {
        let chain_id = self.chain_id();
        self.events.log_batch(&batch);
        if let Some(tip) = batch.iter().filter_map(|log| log.block_number).max() {
            self.prune(tip);
        }

        for log in batch {
            let message = match self.decoder.decode(&log) {
                Ok(Some(message)) => message,
                Ok(None) => continue,
                Err(err) => {
                    Metrics::record_decode_error(chain_id);
                    error!(
                        target: "relayer::watcher",
                        chain_id,
                        block_number = ?log.block_number,
                        log_index = ?log.log_index,
                        tx_hash = ?log.transaction_hash,
                        %err,
                        "Dropping undecodable messenger log"
                    );
                    continue;
                }
            };
            Metrics::record_observed(chain_id);

            let Some(key) = MessageKey::from_log(chain_id, &log) else {
                warn!(target: "relayer::watcher", chain_id, tx_hash = ?log.transaction_hash, "Skipping sent message without block position");
                continue;
            };
            if !self.context.ledger.begin(key, message.destination) {
                debug!(target: "relayer::watcher", %key, "Sent message already attempted");
                continue;
            }
            info!(
                target: "relayer::watcher",
                %key,
                destination = message.destination,
                nonce = %message.nonce,
                "Observed sent message"
            );

            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    self.context.ledger.mark_failed(key, RelayError::Cancelled);
                    return;
                }
                permit = self.permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            let task = RelayTask {
                context: self.context.clone(),
                source: self.source.clone(),
                key,
                log,
                message,
                cancel: self.cancel.clone(),
            };
            self.tasks.spawn(task.run(permit));
        }
    }

    /// Forgets finished attempts that fell out of the retention window ending at `tip`.
    ///
    /// The watcher never goes back past blocks it already covered, so pruned messages are not
    /// observed again.
    fn prune(&self, tip: u64) {
        let horizon = tip.saturating_sub(self.retention_blocks);
        let pruned = self.context.ledger.prune(self.chain_id(), horizon);
        if pruned > 0 {
            debug!(target: "relayer::ledger", chain_id = self.chain_id(), horizon, pruned, "Pruned finished attempts");
        }
    }

    async fn drain(&mut self) {
        let chain_id = self.chain_id();
        if self.tasks.is_empty() {
            return;
        }
        info!(
            target: "relayer::watcher",
            chain_id,
            in_flight = self.tasks.len(),
            grace = ?self.shutdown_grace,
            "Waiting for in-flight relays"
        );

        let tasks = &mut self.tasks;
        let drained = tokio::time::timeout(self.shutdown_grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            self.tasks.shutdown().await;
            let abandoned = self.context.ledger.abandon_unfinished(chain_id);
            warn!(target: "relayer::watcher", chain_id, abandoned, "Abandoned in-flight relays after shutdown grace period");
        }
    }
}
