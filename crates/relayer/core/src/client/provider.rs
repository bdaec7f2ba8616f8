//! [`ChainReader`] and [`InboxWriter`] backed by an alloy provider.

use super::{BlockSeal, CallOutcome, ChainReader, InboxWriter, LogBatchStream, RelayReceipt};
use alloy_eips::BlockId;
use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, B256, Bytes, ChainId, TxHash};
use alloy_provider::{
    DynProvider, PendingTransactionBuilder, PendingTransactionError, Provider, ProviderBuilder,
    WatchTxError,
};
use alloy_rpc_types_eth::{Filter, Log, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::{TransportErrorKind, TransportResult};
use async_trait::async_trait;
use futures::StreamExt;
use kona_interop::{CROSS_L2_INBOX_ADDRESS, ExecutedMessage, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A chain client that signs inbox transactions with a local key.
#[derive(Debug, Clone)]
pub struct AlloyChainClient {
    chain_id: ChainId,
    sender: Address,
    provider: DynProvider,
}

impl AlloyChainClient {
    /// Connects to the endpoint and resolves its chain id.
    pub async fn connect(url: Url, signer: PrivateKeySigner) -> TransportResult<Self> {
        let sender = signer.address();
        let provider =
            ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(url).erased();
        let chain_id = provider.get_chain_id().await?;
        debug!(target: "relayer::client", chain_id, %sender, "Connected to chain");
        Ok(Self { chain_id, sender, provider })
    }

    /// Returns the chain id resolved at connection time.
    pub const fn resolved_chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Returns the account that signs inbox transactions.
    pub const fn sender(&self) -> Address {
        self.sender
    }

    fn inbox_request(&self, input: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.sender)
            .with_to(CROSS_L2_INBOX_ADDRESS)
            .with_input(input)
    }
}

#[async_trait]
impl ChainReader for AlloyChainClient {
    async fn chain_id(&self) -> TransportResult<ChainId> {
        self.provider.get_chain_id().await
    }

    async fn block_by_hash(&self, hash: B256) -> TransportResult<Option<BlockSeal>> {
        let block = self.provider.get_block_by_hash(hash).await?;
        Ok(block.map(|block| BlockSeal {
            hash: block.header.hash,
            number: block.header.number,
            timestamp: block.header.timestamp,
        }))
    }

    async fn latest_block_number(&self) -> TransportResult<u64> {
        self.provider.get_block_number().await
    }

    async fn messenger_logs(&self, poll_interval: Duration) -> TransportResult<LogBatchStream> {
        let filter = Filter::new().address(L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS);
        let poller = self.provider.watch_logs(&filter).await?;
        Ok(poller.with_poll_interval(poll_interval).into_stream().boxed())
    }

    async fn messenger_logs_in_range(&self, from: u64, to: u64) -> TransportResult<Vec<Log>> {
        let filter = Filter::new()
            .address(L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS)
            .from_block(from)
            .to_block(to);
        self.provider.get_logs(&filter).await
    }
}

#[async_trait]
impl InboxWriter for AlloyChainClient {
    async fn pending_nonce(&self) -> TransportResult<u64> {
        self.provider.get_transaction_count(self.sender).pending().await
    }

    async fn call_inbox(&self, input: Bytes, block: Option<u64>) -> TransportResult<CallOutcome> {
        let call = self.provider.call(self.inbox_request(input));
        let call = match block {
            Some(number) => call.block(BlockId::number(number)),
            None => call,
        };
        match call.await {
            Ok(_) => Ok(CallOutcome::Success),
            Err(err) => match err.as_error_resp().and_then(|payload| payload.as_revert_data()) {
                Some(data) => Ok(CallOutcome::Reverted(data)),
                None => Err(err),
            },
        }
    }

    async fn send_inbox_transaction(&self, input: Bytes, nonce: u64) -> TransportResult<TxHash> {
        let request = self.inbox_request(input).with_nonce(nonce);
        let pending = self.provider.send_transaction(request).await?;
        Ok(*pending.tx_hash())
    }

    async fn receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> TransportResult<Option<RelayReceipt>> {
        // `get_receipt` also polls for the receipt, so a transaction mined before the heartbeat
        // registered the watch is still found.
        let pending = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .with_timeout(Some(timeout));
        let Some(receipt) = included(pending.get_receipt().await)? else {
            return Ok(None);
        };
        let executed = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == CROSS_L2_INBOX_ADDRESS)
            .filter_map(|log| ExecutedMessage::parse(&log.inner)?.ok())
            .collect();

        Ok(Some(RelayReceipt {
            tx_hash,
            block_number: receipt.block_number().unwrap_or_default(),
            success: receipt.status(),
            executed,
        }))
    }
}

/// Maps the result of a receipt wait. A wait that timed out is `None`.
fn included<R>(result: Result<R, PendingTransactionError>) -> TransportResult<Option<R>> {
    match result {
        Ok(receipt) => Ok(Some(receipt)),
        Err(PendingTransactionError::TxWatcher(WatchTxError::Timeout)) => Ok(None),
        Err(PendingTransactionError::TransportError(err)) => Err(err),
        Err(err) => Err(TransportErrorKind::custom(err)),
    }
}
