//! Test doubles for the chain seams.

use crate::{BlockSeal, CallOutcome, ChainReader, InboxWriter, LogBatchStream, RelayReceipt};
use alloy_json_rpc::ErrorPayload;
use alloy_primitives::{Address, B256, Bytes, ChainId, TxHash, U256, address, keccak256};
use alloy_rpc_types_eth::Log;
use alloy_sol_types::SolCall;
use alloy_transport::{RpcError, TransportResult};
use async_trait::async_trait;
use futures::{
    StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded},
};
use kona_interop::{
    ExecutedMessage, ICrossL2Inbox, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS, MessageIdentifier,
    SentMessage,
};
use mockall::mock;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::Notify;

mock! {
    #[derive(Debug)]
    pub ChainClient {}

    #[async_trait]
    impl ChainReader for ChainClient {
        async fn chain_id(&self) -> TransportResult<ChainId>;
        async fn block_by_hash(&self, hash: B256) -> TransportResult<Option<BlockSeal>>;
        async fn latest_block_number(&self) -> TransportResult<u64>;
        async fn messenger_logs(&self, poll_interval: Duration) -> TransportResult<LogBatchStream>;
        async fn messenger_logs_in_range(&self, from: u64, to: u64) -> TransportResult<Vec<Log>>;
    }

    #[async_trait]
    impl InboxWriter for ChainClient {
        async fn pending_nonce(&self) -> TransportResult<u64>;
        async fn call_inbox(&self, input: Bytes, block: Option<u64>) -> TransportResult<CallOutcome>;
        async fn send_inbox_transaction(&self, input: Bytes, nonce: u64) -> TransportResult<TxHash>;
        async fn receipt(&self, tx_hash: TxHash, timeout: Duration) -> TransportResult<Option<RelayReceipt>>;
    }
}

const SENDER: Address = address!("0x00000000000000000000000000000000000a11ce");
const TARGET: Address = address!("0x0000000000000000000000000000000000000b0b");

/// Returns a sent message from `source` to `destination`.
pub(crate) fn sent_message(source: ChainId, destination: ChainId, nonce: u64) -> SentMessage {
    SentMessage {
        destination,
        source,
        nonce: U256::from(nonce),
        sender: SENDER,
        target: TARGET,
        message: Bytes::from_static(b"hello interop"),
    }
}

/// Returns the messenger log announcing `message`.
pub(crate) fn sent_message_log(
    message: &SentMessage,
    block_hash: B256,
    block_number: u64,
    log_index: u64,
) -> Log {
    let transaction_hash = keccak256([block_hash.as_slice(), &log_index.to_be_bytes()].concat());
    Log {
        inner: alloy_primitives::Log::new_unchecked(
            L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            vec![],
            message.abi_encode(),
        ),
        block_hash: Some(block_hash),
        block_number: Some(block_number),
        transaction_hash: Some(transaction_hash),
        log_index: Some(log_index),
        ..Default::default()
    }
}

/// A transaction accepted by a [`TestChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SentTransaction {
    pub(crate) tx_hash: TxHash,
    pub(crate) nonce: u64,
    pub(crate) input: Bytes,
}

#[derive(Debug, Default)]
struct TestChainState {
    blocks: HashMap<B256, BlockSeal>,
    next_nonce: u64,
    sent: Vec<SentTransaction>,
    preflight_revert: Option<Bytes>,
    execution_revert: Option<Bytes>,
    receipt_gate: Option<Arc<Notify>>,
    head: u64,
    history: Vec<Log>,
    subscription: Option<UnboundedSender<Vec<Log>>>,
}

/// An in-memory chain that includes inbox transactions immediately.
#[derive(Debug)]
pub(crate) struct TestChain {
    chain_id: ChainId,
    state: Mutex<TestChainState>,
    first_subscription: Mutex<Option<UnboundedReceiver<Vec<Log>>>>,
}

impl TestChain {
    /// Block number assigned to the first included transaction.
    pub(crate) const FIRST_INCLUSION_BLOCK: u64 = 1_000;

    pub(crate) fn new(chain_id: ChainId) -> Arc<Self> {
        // Logs emitted before the relayer subscribes are buffered for its first subscription.
        let (sender, receiver) = unbounded();
        Arc::new(Self {
            chain_id,
            state: Mutex::new(TestChainState {
                subscription: Some(sender),
                ..Default::default()
            }),
            first_subscription: Mutex::new(Some(receiver)),
        })
    }

    /// Adds a block and returns its seal.
    pub(crate) fn add_block(&self, number: u64, timestamp: u64) -> BlockSeal {
        let hash = keccak256([self.chain_id.to_be_bytes(), number.to_be_bytes()].concat());
        let seal = BlockSeal { hash, number, timestamp };
        self.state.lock().unwrap().blocks.insert(hash, seal);
        seal
    }

    /// Emits a batch of messenger logs.
    ///
    /// The logs are delivered to the current subscription, if any, and stay queryable by range.
    pub(crate) fn emit(&self, logs: Vec<Log>) {
        let mut state = self.state.lock().unwrap();
        if let Some(tip) = logs.iter().filter_map(|log| log.block_number).max() {
            state.head = state.head.max(tip);
        }
        state.history.extend(logs.iter().cloned());
        if let Some(subscription) = &state.subscription {
            let _ = subscription.unbounded_send(logs);
        }
    }

    /// Ends the current log subscription, as a node does when it drops a filter.
    pub(crate) fn drop_subscription(&self) {
        self.state.lock().unwrap().subscription = None;
    }

    /// Returns the transactions accepted so far.
    pub(crate) fn sent(&self) -> Vec<SentTransaction> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Makes `validateMessage` revert with `data`.
    pub(crate) fn reject_preflight(&self, data: Bytes) {
        self.state.lock().unwrap().preflight_revert = Some(data);
    }

    /// Makes included transactions revert, and their replay revert with `data`.
    pub(crate) fn revert_execution(&self, data: Bytes) {
        self.state.lock().unwrap().execution_revert = Some(data);
    }

    /// Holds receipts back until the returned [`Notify`] is notified.
    pub(crate) fn hold_receipts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().unwrap().receipt_gate = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl ChainReader for TestChain {
    async fn chain_id(&self) -> TransportResult<ChainId> {
        Ok(self.chain_id)
    }

    async fn block_by_hash(&self, hash: B256) -> TransportResult<Option<BlockSeal>> {
        Ok(self.state.lock().unwrap().blocks.get(&hash).copied())
    }

    async fn latest_block_number(&self) -> TransportResult<u64> {
        Ok(self.state.lock().unwrap().head)
    }

    async fn messenger_logs(&self, _poll_interval: Duration) -> TransportResult<LogBatchStream> {
        if let Some(receiver) = self.first_subscription.lock().unwrap().take() {
            return Ok(receiver.boxed());
        }
        let (sender, receiver) = unbounded();
        self.state.lock().unwrap().subscription = Some(sender);
        Ok(receiver.boxed())
    }

    async fn messenger_logs_in_range(&self, from: u64, to: u64) -> TransportResult<Vec<Log>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .history
            .iter()
            .filter(|log| log.block_number.is_some_and(|number| (from..=to).contains(&number)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InboxWriter for TestChain {
    async fn pending_nonce(&self) -> TransportResult<u64> {
        Ok(self.state.lock().unwrap().next_nonce)
    }

    async fn call_inbox(&self, _input: Bytes, block: Option<u64>) -> TransportResult<CallOutcome> {
        let state = self.state.lock().unwrap();
        let revert = if block.is_some() { &state.execution_revert } else { &state.preflight_revert };
        Ok(revert.clone().map_or(CallOutcome::Success, CallOutcome::Reverted))
    }

    async fn send_inbox_transaction(&self, input: Bytes, nonce: u64) -> TransportResult<TxHash> {
        let mut state = self.state.lock().unwrap();
        if nonce != state.next_nonce {
            return Err(RpcError::ErrorResp(ErrorPayload {
                code: -32000,
                message: "nonce too low".into(),
                data: None,
            }));
        }
        let tx_hash =
            keccak256([input.as_ref(), &self.chain_id.to_be_bytes(), &nonce.to_be_bytes()].concat());
        state.next_nonce += 1;
        state.sent.push(SentTransaction { tx_hash, nonce, input });
        Ok(tx_hash)
    }

    async fn receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> TransportResult<Option<RelayReceipt>> {
        let gate = self.state.lock().unwrap().receipt_gate.clone();
        if let Some(gate) = gate {
            if tokio::time::timeout(timeout, gate.notified()).await.is_err() {
                return Ok(None);
            }
        }

        let state = self.state.lock().unwrap();
        let Some(index) = state.sent.iter().position(|tx| tx.tx_hash == tx_hash) else {
            return Ok(None);
        };
        let success = state.execution_revert.is_none();
        let executed = if success {
            let call = ICrossL2Inbox::executeMessageCall::abi_decode(&state.sent[index].input)
                .unwrap();
            vec![ExecutedMessage {
                payload_hash: keccak256(&call._message),
                identifier: MessageIdentifier::try_from(call._id).unwrap(),
            }]
        } else {
            vec![]
        };
        Ok(Some(RelayReceipt {
            tx_hash,
            block_number: Self::FIRST_INCLUSION_BLOCK + index as u64,
            success,
            executed,
        }))
    }
}
