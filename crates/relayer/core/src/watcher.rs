//! Subscription to messenger logs on a source chain.

use crate::{ChainClient, DomainHandle, LogBatchStream, RetryPolicy};
use alloy_rpc_types_eth::Log;
use alloy_transport::TransportResult;
use backon::BackoffBuilder;
use futures::StreamExt;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{info, warn};

/// Streams batches of `L2ToL2CrossDomainMessenger` logs from one chain.
///
/// The subscription is re-established whenever it fails or ends, so [`EventWatcher::next_batch`]
/// only returns when a batch is available. A new subscription only sees blocks from the chain
/// head onwards, so the blocks between the last one observed and that head are backfilled with a
/// range query. Logs in the overlap may be returned twice.
pub struct EventWatcher {
    source: Arc<DomainHandle>,
    poll_interval: Duration,
    retry: RetryPolicy,
    stream: Option<LogBatchStream>,
    /// The highest block known to be covered.
    cursor: Option<u64>,
}

impl fmt::Debug for EventWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventWatcher")
            .field("chain_id", &self.source.chain_id())
            .field("poll_interval", &self.poll_interval)
            .field("subscribed", &self.stream.is_some())
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// A fresh log subscription.
struct Subscription {
    stream: LogBatchStream,
    head: u64,
    backfill: Vec<Log>,
}

impl EventWatcher {
    /// Creates a watcher for `source`. The subscription is opened lazily.
    pub const fn new(source: Arc<DomainHandle>, poll_interval: Duration, retry: RetryPolicy) -> Self {
        Self { source, poll_interval, retry, stream: None, cursor: None }
    }

    /// Returns the highest block known to be covered, if any.
    pub const fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Waits for the next non-empty batch of logs.
    ///
    /// Cancel safe: dropping the future loses no batch.
    pub async fn next_batch(&mut self) -> Vec<Log> {
        loop {
            if self.stream.is_none() {
                let subscription =
                    Self::subscribe(self.source.clone(), self.poll_interval, self.retry, self.cursor)
                        .await;
                self.stream = Some(subscription.stream);
                self.advance(Some(subscription.head));
                if !subscription.backfill.is_empty() {
                    return subscription.backfill;
                }
            }
            let Some(stream) = self.stream.as_mut() else {
                continue;
            };

            match stream.next().await {
                Some(batch) if batch.is_empty() => continue,
                Some(batch) => {
                    self.advance(batch.iter().filter_map(|log| log.block_number).max());
                    return batch;
                }
                None => {
                    warn!(target: "relayer::watcher", chain_id = self.source.chain_id(), cursor = ?self.cursor, "Log subscription ended, resubscribing");
                    self.stream = None;
                }
            }
        }
    }

    fn advance(&mut self, block: Option<u64>) {
        self.cursor = self.cursor.max(block);
    }

    /// Opens a subscription, retrying until it succeeds.
    async fn subscribe(
        source: Arc<DomainHandle>,
        poll_interval: Duration,
        retry: RetryPolicy,
        cursor: Option<u64>,
    ) -> Subscription {
        let chain_id = source.chain_id();
        let mut backoff = retry.unbounded().build();
        loop {
            match Self::open(source.client(), poll_interval, cursor).await {
                Ok(subscription) => {
                    info!(
                        target: "relayer::watcher",
                        chain_id,
                        head = subscription.head,
                        backfilled = subscription.backfill.len(),
                        "Subscribed to messenger logs"
                    );
                    return subscription;
                }
                Err(err) => {
                    let delay = backoff.next().unwrap_or(retry.max_delay);
                    warn!(target: "relayer::watcher", chain_id, %err, ?delay, "Failed to subscribe to messenger logs, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn open(
        client: &dyn ChainClient,
        poll_interval: Duration,
        cursor: Option<u64>,
    ) -> TransportResult<Subscription> {
        // Subscribe before reading the head so no block falls between the two.
        let stream = client.messenger_logs(poll_interval).await?;
        let head = client.latest_block_number().await?;
        let backfill = match cursor {
            Some(cursor) if head > cursor => client.messenger_logs_in_range(cursor + 1, head).await?,
            _ => Vec::new(),
        };
        Ok(Subscription { stream, head, backfill })
    }
}
