//! Per-chain serialization of inbox transactions.
//!
//! Every executing transaction for a chain is signed with the same account, so submissions to a
//! chain go through a single [`NonceSequencer`] task that assigns nonces in order.

use crate::{ChainClient, SubmissionError};
use alloy_primitives::{Bytes, ChainId, TxHash};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Capacity of the submission channel of each chain.
const SUBMISSION_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct SubmitRequest {
    input: Bytes,
    reply: oneshot::Sender<Result<TxHash, SubmissionError>>,
}

/// Handle to the submission task of a chain.
#[derive(Debug, Clone)]
pub struct SubmissionQueue {
    chain_id: ChainId,
    sender: mpsc::Sender<SubmitRequest>,
}

impl SubmissionQueue {
    /// Spawns the submission task for a chain.
    ///
    /// The task stops when `cancel` fires. Requests queued at that point fail with
    /// [`SubmissionError::QueueClosed`].
    pub fn spawn(
        chain_id: ChainId,
        client: Arc<dyn ChainClient>,
        cancel: CancellationToken,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(SUBMISSION_CHANNEL_CAPACITY);
        let sequencer = NonceSequencer { chain_id, client, next_nonce: None };
        tokio::spawn(sequencer.run(receiver, cancel));
        Self { chain_id, sender }
    }

    /// Submits an inbox transaction with the given calldata and returns its hash.
    pub async fn submit(&self, input: Bytes) -> Result<TxHash, SubmissionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(SubmitRequest { input, reply })
            .await
            .map_err(|_| SubmissionError::QueueClosed(self.chain_id))?;
        response.await.map_err(|_| SubmissionError::QueueClosed(self.chain_id))?
    }
}

/// Owns the nonce of the relayer account on one chain.
///
/// The nonce is fetched lazily from the pending state, advanced after every accepted submission
/// and discarded after a failed one so the next submission re-reads it.
#[derive(Debug)]
struct NonceSequencer {
    chain_id: ChainId,
    client: Arc<dyn ChainClient>,
    next_nonce: Option<u64>,
}

impl NonceSequencer {
    async fn run(mut self, mut receiver: mpsc::Receiver<SubmitRequest>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(target: "relayer::dispatcher", chain_id = self.chain_id, "Submission queue cancellation requested, stopping...");
                    break;
                }
                request = receiver.recv() => {
                    let Some(SubmitRequest { input, reply }) = request else {
                        break;
                    };
                    let result = self.submit(input).await;
                    // The requester may have given up on the reply.
                    let _ = reply.send(result);
                }
            }
        }
    }

    async fn submit(&mut self, input: Bytes) -> Result<TxHash, SubmissionError> {
        let nonce = match self.next_nonce {
            Some(nonce) => nonce,
            None => self.client.pending_nonce().await.map_err(SubmissionError::from_transport)?,
        };

        match self.client.send_inbox_transaction(input, nonce).await {
            Ok(tx_hash) => {
                debug!(target: "relayer::dispatcher", chain_id = self.chain_id, nonce, %tx_hash, "Submitted inbox transaction");
                self.next_nonce = Some(nonce + 1);
                Ok(tx_hash)
            }
            Err(err) => {
                warn!(target: "relayer::dispatcher", chain_id = self.chain_id, nonce, %err, "Inbox transaction submission failed");
                self.next_nonce = None;
                Err(SubmissionError::from_transport(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChainClient;
    use alloy_primitives::B256;
    use alloy_transport::TransportErrorKind;
    use mockall::{Sequence, predicate::eq};

    #[tokio::test]
    async fn test_nonces_are_sequential() {
        let mut client = MockChainClient::new();
        client.expect_pending_nonce().times(1).returning(|| Ok(7));
        let mut seq = Sequence::new();
        for nonce in 7..10 {
            client
                .expect_send_inbox_transaction()
                .with(mockall::predicate::always(), eq(nonce))
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, nonce| Ok(B256::with_last_byte(nonce as u8)));
        }

        let queue = SubmissionQueue::spawn(10, Arc::new(client), CancellationToken::new());
        for nonce in 7..10u8 {
            let tx_hash = queue.submit(Bytes::new()).await.unwrap();
            assert_eq!(tx_hash, B256::with_last_byte(nonce));
        }
    }

    #[tokio::test]
    async fn test_nonce_is_refetched_after_failure() {
        let mut client = MockChainClient::new();
        let mut seq = Sequence::new();
        client.expect_pending_nonce().times(1).in_sequence(&mut seq).returning(|| Ok(3));
        client
            .expect_send_inbox_transaction()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(TransportErrorKind::custom_str("connection reset")));
        client.expect_pending_nonce().times(1).in_sequence(&mut seq).returning(|| Ok(3));
        client
            .expect_send_inbox_transaction()
            .with(mockall::predicate::always(), eq(3))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(B256::repeat_byte(0x01)));

        let queue = SubmissionQueue::spawn(10, Arc::new(client), CancellationToken::new());
        let err = queue.submit(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Transport(_)));
        assert_eq!(queue.submit(Bytes::new()).await.unwrap(), B256::repeat_byte(0x01));
    }

    #[tokio::test]
    async fn test_cancelled_queue_is_closed() {
        let client = MockChainClient::new();
        let cancel = CancellationToken::new();
        let queue = SubmissionQueue::spawn(10, Arc::new(client), cancel.clone());
        cancel.cancel();
        // Let the sequencer observe the cancellation.
        tokio::task::yield_now().await;

        let err = queue.submit(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::QueueClosed(10)));
    }
}
