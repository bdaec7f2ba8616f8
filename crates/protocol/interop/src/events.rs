//! Lifecycle events emitted by the interop predeploys.

use crate::{
    ICrossL2Inbox::ExecutingMessage,
    IL2ToL2CrossDomainMessenger::{FailedRelayedMessage, RelayedMessage},
    IdentifierOverflow, MessageIdentifier,
};
use alloy_primitives::{B256, Log};
use alloy_sol_types::SolEvent;
use derive_more::Display;

/// A relay outcome reported by the `L2ToL2CrossDomainMessenger`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum MessengerEvent {
    /// The message was relayed and its target call succeeded.
    #[display("RelayedMessage({message_hash})")]
    Relayed {
        /// The messenger hash of the relayed message.
        message_hash: B256,
    },
    /// The message was relayed but its target call failed.
    #[display("FailedRelayedMessage({message_hash})")]
    Failed {
        /// The messenger hash of the failed message.
        message_hash: B256,
    },
}

impl MessengerEvent {
    /// Parses a messenger log into a [`MessengerEvent`].
    ///
    /// Returns `None` for logs that are not one of the two lifecycle events, including the
    /// anonymous "message sent" log.
    pub fn parse(log: &Log) -> Option<Self> {
        let topic = *log.topics().first()?;
        if topic == RelayedMessage::SIGNATURE_HASH {
            let event = RelayedMessage::decode_log_data(&log.data).ok()?;
            return Some(Self::Relayed { message_hash: event.messageHash });
        }
        if topic == FailedRelayedMessage::SIGNATURE_HASH {
            let event = FailedRelayedMessage::decode_log_data(&log.data).ok()?;
            return Some(Self::Failed { message_hash: event.messageHash });
        }
        None
    }

    /// Returns the messenger hash carried by the event.
    pub const fn message_hash(&self) -> B256 {
        match self {
            Self::Relayed { message_hash } | Self::Failed { message_hash } => *message_hash,
        }
    }

    /// Returns the event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Relayed { .. } => "RelayedMessage",
            Self::Failed { .. } => "FailedRelayedMessage",
        }
    }
}

/// An `ExecutingMessage` event emitted by the `CrossL2Inbox` on the destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedMessage {
    /// The hash of the executed message payload.
    pub payload_hash: B256,
    /// The identifier the inbox validated.
    pub identifier: MessageIdentifier,
}

impl ExecutedMessage {
    /// Parses an inbox log into an [`ExecutedMessage`].
    ///
    /// Returns `None` if the log is not an `ExecutingMessage` event, and an error if it is one but
    /// its identifier does not fit the typed representation.
    pub fn parse(log: &Log) -> Option<Result<Self, IdentifierOverflow>> {
        if log.topics().first() != Some(&ExecutingMessage::SIGNATURE_HASH) {
            return None;
        }
        let event = ExecutingMessage::decode_log_data(&log.data).ok()?;
        Some(
            MessageIdentifier::try_from(event.id)
                .map(|identifier| Self { payload_hash: event.msgHash, identifier }),
        )
    }
}
