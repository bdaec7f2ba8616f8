//! Construction of message identifiers from source logs.

use crate::{DomainHandle, RelayError, RetryPolicy};
use alloy_rpc_types_eth::Log;
use kona_interop::MessageIdentifier;
use tracing::debug;

/// Builds the [`MessageIdentifier`] that locates a sent message on its source chain.
#[derive(Debug, Clone, Copy)]
pub struct IdentifierBuilder {
    retry: RetryPolicy,
}

impl IdentifierBuilder {
    /// Creates a builder that retries block lookups with `retry`.
    pub const fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    /// Builds the identifier of a log observed on `source`.
    ///
    /// The block number and timestamp are read from the block that contains the log, looked up
    /// by hash so a reorg cannot substitute another block at the same height.
    pub async fn build(
        &self,
        source: &DomainHandle,
        log: &Log,
    ) -> Result<MessageIdentifier, RelayError> {
        let block_hash = log.block_hash.ok_or(RelayError::IncompleteLog("block hash"))?;
        let log_index = log.log_index.ok_or(RelayError::IncompleteLog("log index"))?;

        let client = source.client();
        let block = self
            .retry
            .run("block_by_hash", || async move {
                client.block_by_hash(block_hash).await?.ok_or(RelayError::BlockNotFound(block_hash))
            })
            .await?;

        let identifier = MessageIdentifier {
            origin: log.inner.address,
            block_number: block.number,
            log_index,
            timestamp: block.timestamp,
            chain_id: source.chain_id(),
        };
        debug!(target: "relayer::watcher", %identifier, %block_hash, "Built message identifier");
        Ok(identifier)
    }
}
