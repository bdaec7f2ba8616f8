//! Submission of executing transactions to destination chains.

use crate::{
    CallOutcome, ChainRegistry, DomainHandle, RelayError, RetryPolicy, SubmissionError,
    metrics::Metrics,
};
use alloy_primitives::{Bytes, ChainId, TxHash};
use kona_interop::{
    ExecuteMessage, InboxRevert, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS, MessageIdentifier,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// An executing transaction that was accepted by the destination node.
#[derive(Debug, Clone)]
pub struct PendingRelay {
    /// The destination chain.
    pub destination: Arc<DomainHandle>,
    /// The executing transaction.
    pub tx_hash: TxHash,
    /// The `executeMessage` call carried by the transaction.
    pub request: ExecuteMessage,
}

/// Turns sent messages into executing transactions on their destination chain.
#[derive(Debug)]
pub struct RelayDispatcher {
    registry: Arc<ChainRegistry>,
    preflight: bool,
    retry: RetryPolicy,
}

impl RelayDispatcher {
    /// Creates a new [`RelayDispatcher`].
    pub const fn new(registry: Arc<ChainRegistry>, preflight: bool, retry: RetryPolicy) -> Self {
        Self { registry, preflight, retry }
    }

    /// Submits `executeMessage(identifier, messenger, message)` to the inbox of `destination`.
    ///
    /// With preflight enabled, the message is first checked with `validateMessage` and not
    /// submitted if the inbox would reject it. Transport failures are retried; a rejection by the
    /// node is not.
    ///
    /// `cancel` is honored until the transaction is handed to the submission queue.
    pub async fn dispatch(
        &self,
        destination: ChainId,
        identifier: MessageIdentifier,
        message: Bytes,
        cancel: &CancellationToken,
    ) -> Result<PendingRelay, RelayError> {
        let handle = self
            .registry
            .get(destination)
            .map_err(|_| RelayError::DestinationUnresolved(destination))?;
        let request = ExecuteMessage::new(identifier, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS, message);

        if self.preflight {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RelayError::Cancelled),
                checked = self.preflight(handle, &request) => checked?,
            }
        }
        if cancel.is_cancelled() {
            return Err(RelayError::Cancelled);
        }

        let submissions = handle.submissions();
        let calldata = request.calldata();
        let calldata = &calldata;
        let tx_hash = self
            .retry
            .run("submit", || async move { Ok(submissions.submit(calldata.clone()).await?) })
            .await?;

        Metrics::record_submitted(destination);
        info!(
            target: "relayer::dispatcher",
            destination,
            %identifier,
            %tx_hash,
            "Sent executing message"
        );
        Ok(PendingRelay { destination: handle.clone(), tx_hash, request })
    }

    async fn preflight(
        &self,
        handle: &DomainHandle,
        request: &ExecuteMessage,
    ) -> Result<(), RelayError> {
        let client = handle.client();
        let calldata = request.validate_calldata();
        let calldata = &calldata;
        let outcome = self
            .retry
            .run("validate_message", || async move {
                Ok(client.call_inbox(calldata.clone(), None).await?)
            })
            .await?;

        match outcome {
            CallOutcome::Success => {
                debug!(target: "relayer::dispatcher", destination = handle.chain_id(), identifier = %request.identifier, "Message passed inbox validation");
                Ok(())
            }
            CallOutcome::Reverted(data) => {
                Err(SubmissionError::Preflight(InboxRevert::decode(&data)).into())
            }
        }
    }
}
