//! RPC seams of the relayer.
//!
//! The engine talks to each chain through [`ChainReader`] and [`InboxWriter`]. The production
//! implementation is [`AlloyChainClient`].

use alloy_primitives::{B256, Bytes, ChainId, TxHash};
use alloy_rpc_types_eth::Log;
use alloy_transport::TransportResult;
use async_trait::async_trait;
use futures::stream::BoxStream;
use kona_interop::ExecutedMessage;
use std::{fmt::Debug, time::Duration};

mod provider;
pub use provider::AlloyChainClient;

/// A stream of log batches, one batch per poll.
pub type LogBatchStream = BoxStream<'static, Vec<Log>>;

/// The fields of a block needed to identify a log within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSeal {
    /// The block hash.
    pub hash: B256,
    /// The block number.
    pub number: u64,
    /// The block timestamp.
    pub timestamp: u64,
}

/// The result of simulating a `CrossL2Inbox` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call succeeded.
    Success,
    /// The call reverted with the given data.
    Reverted(Bytes),
}

/// The receipt of an executing transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReceipt {
    /// The transaction hash.
    pub tx_hash: TxHash,
    /// The block that included the transaction.
    pub block_number: u64,
    /// Whether the transaction succeeded.
    pub success: bool,
    /// The `ExecutingMessage` events emitted by the transaction.
    pub executed: Vec<ExecutedMessage>,
}

/// Read access to a chain.
#[async_trait]
pub trait ChainReader: Debug + Send + Sync {
    /// Returns the chain id reported by the endpoint.
    async fn chain_id(&self) -> TransportResult<ChainId>;

    /// Returns the block with the given hash, if the endpoint knows it.
    async fn block_by_hash(&self, hash: B256) -> TransportResult<Option<BlockSeal>>;

    /// Returns the number of the latest block.
    async fn latest_block_number(&self) -> TransportResult<u64>;

    /// Subscribes to logs emitted by the `L2ToL2CrossDomainMessenger`.
    ///
    /// The subscription starts at the chain head. The stream ends when the subscription is lost.
    async fn messenger_logs(&self, poll_interval: Duration) -> TransportResult<LogBatchStream>;

    /// Returns the `L2ToL2CrossDomainMessenger` logs of blocks `from..=to`.
    async fn messenger_logs_in_range(&self, from: u64, to: u64) -> TransportResult<Vec<Log>>;
}

/// Write access to the `CrossL2Inbox` of a chain.
#[async_trait]
pub trait InboxWriter: Debug + Send + Sync {
    /// Returns the pending nonce of the relayer account.
    async fn pending_nonce(&self) -> TransportResult<u64>;

    /// Simulates a call to the inbox from the relayer account.
    ///
    /// Runs against the given block, or the latest block if `None`.
    async fn call_inbox(&self, input: Bytes, block: Option<u64>) -> TransportResult<CallOutcome>;

    /// Signs and broadcasts a transaction to the inbox with the given nonce.
    async fn send_inbox_transaction(&self, input: Bytes, nonce: u64) -> TransportResult<TxHash>;

    /// Waits up to `timeout` for the transaction to be included and returns its receipt.
    ///
    /// Returns `None` if the transaction was not included in time.
    async fn receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> TransportResult<Option<RelayReceipt>>;
}

/// A client that can both observe a chain and execute messages on it.
pub trait ChainClient: ChainReader + InboxWriter {}

impl<T: ChainReader + InboxWriter + ?Sized> ChainClient for T {}
