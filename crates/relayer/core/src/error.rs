//! Error types for the relay engine.

use alloy_primitives::{B256, ChainId, TxHash};
use alloy_transport::TransportError;
use kona_interop::{DecodeError, InboxRevert};
use thiserror::Error;
use url::Url;

/// An error raised while building the [`ChainRegistry`](crate::ChainRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No endpoints were configured.
    #[error("no rpc endpoints configured")]
    NoEndpoints,
    /// An endpoint could not report its chain id.
    #[error("failed to resolve chain id of {url}: {source}")]
    Connect {
        /// The endpoint that failed.
        url: Url,
        /// The underlying transport error.
        #[source]
        source: TransportError,
    },
    /// Two endpoints report the same chain id.
    #[error("more than one endpoint reports chain id {0}")]
    DuplicateChain(ChainId),
    /// A chain id has no registered endpoint.
    #[error("no chain registered for chain id {0}")]
    UnknownChain(ChainId),
}

/// An error raised while submitting an executing transaction.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The node rejected the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(#[source] TransportError),
    /// The request did not reach the node or its response was lost.
    #[error("transport failure while submitting: {0}")]
    Transport(#[source] TransportError),
    /// The inbox would reject the message.
    #[error("inbox validation failed: {0}")]
    Preflight(InboxRevert),
    /// The submission queue of the chain is no longer running.
    #[error("submission queue for chain {0} is closed")]
    QueueClosed(ChainId),
}

impl SubmissionError {
    /// Classifies a transport error returned while submitting.
    ///
    /// JSON-RPC error responses are final rejections, everything else is a transport failure.
    pub fn from_transport(err: TransportError) -> Self {
        if err.is_error_resp() { Self::Rejected(err) } else { Self::Transport(err) }
    }
}

/// An error raised while waiting for an executing transaction to be confirmed.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// The transaction was included but reverted.
    #[error("transaction {tx_hash} reverted in block {block_number}: {reason}")]
    Reverted {
        /// The reverted transaction.
        tx_hash: TxHash,
        /// The block that included the transaction.
        block_number: u64,
        /// The recovered revert reason.
        reason: InboxRevert,
    },
    /// The transaction was not included before the confirmation timeout.
    #[error("transaction {0} not confirmed before timeout")]
    Timeout(TxHash),
}

/// An error that ends a relay attempt.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The source log is not a well-formed sent message.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The destination chain id has no registered endpoint.
    #[error("no chain registered for destination chain id {0}")]
    DestinationUnresolved(ChainId),
    /// An RPC request failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The block that contains the source log could not be found.
    #[error("block {0} not found")]
    BlockNotFound(B256),
    /// The source log is missing positional metadata.
    #[error("log is missing its {0}")]
    IncompleteLog(&'static str),
    /// The executing transaction could not be submitted.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    /// The executing transaction did not confirm successfully.
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),
    /// The relayer is shutting down.
    #[error("relay cancelled")]
    Cancelled,
}

impl RelayError {
    /// Returns `true` if retrying the failed step may succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::BlockNotFound(_) | Self::Submission(SubmissionError::Transport(_))
        )
    }

    /// Returns a short, stable label for the failure, used as a metric label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::DestinationUnresolved(_) => "destination_unresolved",
            Self::Transport(_) => "transport",
            Self::BlockNotFound(_) => "block_not_found",
            Self::IncompleteLog(_) => "incomplete_log",
            Self::Submission(SubmissionError::Rejected(_)) => "rejected",
            Self::Submission(SubmissionError::Transport(_)) => "submission_transport",
            Self::Submission(SubmissionError::Preflight(reason)) => reason.label(),
            Self::Submission(SubmissionError::QueueClosed(_)) => "queue_closed",
            Self::Confirmation(ConfirmationError::Reverted { reason, .. }) => reason.label(),
            Self::Confirmation(ConfirmationError::Timeout(_)) => "timeout",
            Self::Cancelled => "cancelled",
        }
    }
}
