//! Confirmation of executing transactions.

use crate::{
    CallOutcome, ConfirmationError, PendingRelay, RelayError, RelayReceipt, RetryPolicy,
};
use alloy_primitives::Bytes;
use kona_interop::InboxRevert;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Waits for executing transactions and classifies their outcome.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptTracker {
    timeout: Duration,
    retry: RetryPolicy,
}

impl ReceiptTracker {
    /// Creates a tracker that waits up to `timeout` for each transaction.
    pub const fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }

    /// Waits for the receipt of `pending`.
    ///
    /// A reverted transaction is replayed at its inclusion block to recover the inbox error.
    pub async fn track(&self, pending: &PendingRelay) -> Result<RelayReceipt, RelayError> {
        let client = pending.destination.client();
        let tx_hash = pending.tx_hash;
        let timeout = self.timeout;
        let receipt = self
            .retry
            .run("receipt", || async move { Ok(client.receipt(tx_hash, timeout).await?) })
            .await?
            .ok_or(ConfirmationError::Timeout(tx_hash))?;

        if !receipt.success {
            let reason = self.revert_reason(pending, receipt.block_number).await;
            return Err(ConfirmationError::Reverted {
                tx_hash,
                block_number: receipt.block_number,
                reason,
            }
            .into());
        }

        let identifier = pending.request.identifier;
        if !receipt.executed.iter().any(|executed| executed.identifier == identifier) {
            warn!(
                target: "relayer::tracker",
                %tx_hash,
                %identifier,
                "Executing transaction succeeded without a matching ExecutingMessage event"
            );
        }
        info!(
            target: "relayer::tracker",
            destination = pending.destination.chain_id(),
            %tx_hash,
            block_number = receipt.block_number,
            %identifier,
            "Executing message confirmed"
        );
        Ok(receipt)
    }

    async fn revert_reason(&self, pending: &PendingRelay, block_number: u64) -> InboxRevert {
        let client = pending.destination.client();
        match client.call_inbox(pending.request.calldata(), Some(block_number)).await {
            Ok(CallOutcome::Reverted(data)) => InboxRevert::decode(&data),
            Ok(CallOutcome::Success) => {
                debug!(target: "relayer::tracker", tx_hash = %pending.tx_hash, block_number, "Replay of reverted transaction succeeded");
                InboxRevert::Unknown(Bytes::new())
            }
            Err(err) => {
                warn!(target: "relayer::tracker", tx_hash = %pending.tx_hash, %err, "Failed to replay reverted transaction");
                InboxRevert::Unknown(Bytes::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DomainHandle, test_utils::MockChainClient};
    use alloy_primitives::B256;
    use alloy_sol_types::SolError;
    use kona_interop::{
        ExecuteMessage, ExecutedMessage, ICrossL2Inbox, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
        MessageIdentifier,
    };
    use mockall::predicate::eq;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    const TX_HASH: B256 = B256::repeat_byte(0xdd);

    fn request() -> ExecuteMessage {
        ExecuteMessage::new(
            MessageIdentifier {
                origin: L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
                block_number: 12,
                log_index: 1,
                timestamp: 1_700_000_000,
                chain_id: 901,
            },
            L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            Bytes::from_static(b"payload"),
        )
    }

    fn pending(client: MockChainClient) -> PendingRelay {
        PendingRelay {
            destination: Arc::new(DomainHandle::new(
                902,
                Arc::new(client),
                CancellationToken::new(),
            )),
            tx_hash: TX_HASH,
            request: request(),
        }
    }

    fn tracker() -> ReceiptTracker {
        ReceiptTracker::new(
            Duration::from_secs(5),
            RetryPolicy {
                max_attempts: 2,
                min_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
        )
    }

    #[tokio::test]
    async fn test_confirmed() {
        let mut client = MockChainClient::new();
        client.expect_receipt().with(eq(TX_HASH), eq(Duration::from_secs(5))).times(1).returning(
            |tx_hash, _| {
                Ok(Some(RelayReceipt {
                    tx_hash,
                    block_number: 40,
                    success: true,
                    executed: vec![ExecutedMessage {
                        payload_hash: request().payload_hash(),
                        identifier: request().identifier,
                    }],
                }))
            },
        );

        let receipt = tracker().track(&pending(client)).await.unwrap();
        assert_eq!(receipt.block_number, 40);
        assert_eq!(receipt.executed.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout() {
        let mut client = MockChainClient::new();
        client.expect_receipt().times(1).returning(|_, _| Ok(None));

        let err = tracker().track(&pending(client)).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Confirmation(ConfirmationError::Timeout(hash)) if hash == TX_HASH
        ));
    }

    #[tokio::test]
    async fn test_revert_reason_is_recovered() {
        let mut client = MockChainClient::new();
        client.expect_receipt().times(1).returning(|tx_hash, _| {
            Ok(Some(RelayReceipt { tx_hash, block_number: 41, success: false, executed: vec![] }))
        });
        client
            .expect_call_inbox()
            .with(eq(request().calldata()), eq(Some(41)))
            .times(1)
            .returning(|_, _| {
                Ok(CallOutcome::Reverted(ICrossL2Inbox::TargetCallFailed {}.abi_encode().into()))
            });

        let err = tracker().track(&pending(client)).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Confirmation(ConfirmationError::Reverted {
                block_number: 41,
                reason: InboxRevert::TargetCallFailed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_unrecoverable_revert_reason() {
        let mut client = MockChainClient::new();
        client.expect_receipt().times(1).returning(|tx_hash, _| {
            Ok(Some(RelayReceipt { tx_hash, block_number: 41, success: false, executed: vec![] }))
        });
        client.expect_call_inbox().times(1).returning(|_, _| Ok(CallOutcome::Success));

        let err = tracker().track(&pending(client)).await.unwrap_err();
        assert!(matches!(
            err,
            RelayError::Confirmation(ConfirmationError::Reverted {
                reason: InboxRevert::Unknown(_),
                ..
            })
        ));
    }
}
