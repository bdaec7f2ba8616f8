//! Interop message types: the identifier that points at an initiating log, and the decoded
//! "message sent" payload emitted by the `L2ToL2CrossDomainMessenger`.

use crate::{
    ICrossL2Inbox::{self, Identifier},
    IL2ToL2CrossDomainMessenger::relayMessageCall,
};
use alloy_primitives::{Address, B256, Bytes, ChainId, Selector, U256, keccak256};
use alloy_sol_types::{SolCall, SolValue};
use derive_more::Display;
use thiserror::Error;

/// A pointer to a log on a source chain.
///
/// The destination `CrossL2Inbox` re-derives this tuple from the claimed source log before
/// executing a message, so every field must match the originating log exactly.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("{origin}@{chain_id}:{block_number}:{log_index}")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MessageIdentifier {
    /// The address that emitted the log.
    pub origin: Address,
    /// The number of the block containing the log.
    pub block_number: u64,
    /// The index of the log within its block.
    pub log_index: u64,
    /// The timestamp of the block containing the log.
    pub timestamp: u64,
    /// The chain the log was emitted on.
    pub chain_id: ChainId,
}

impl From<MessageIdentifier> for Identifier {
    fn from(id: MessageIdentifier) -> Self {
        Self {
            origin: id.origin,
            blockNumber: U256::from(id.block_number),
            logIndex: U256::from(id.log_index),
            timestamp: U256::from(id.timestamp),
            chainId: U256::from(id.chain_id),
        }
    }
}

impl TryFrom<Identifier> for MessageIdentifier {
    type Error = IdentifierOverflow;

    fn try_from(id: Identifier) -> Result<Self, Self::Error> {
        let narrow = |field: &'static str, value: U256| {
            u64::try_from(value).map_err(|_| IdentifierOverflow { field, value })
        };
        Ok(Self {
            origin: id.origin,
            block_number: narrow("blockNumber", id.blockNumber)?,
            log_index: narrow("logIndex", id.logIndex)?,
            timestamp: narrow("timestamp", id.timestamp)?,
            chain_id: narrow("chainId", id.chainId)?,
        })
    }
}

/// An ABI identifier field that does not fit in 64 bits.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("identifier field {field} = {value} does not fit in 64 bits")]
pub struct IdentifierOverflow {
    /// The name of the overflowing field.
    pub field: &'static str,
    /// The raw value.
    pub value: U256,
}

/// Errors raised while decoding a "message sent" log payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload cannot even hold a function selector.
    #[error("payload of {0} bytes is too short to hold a selector")]
    Truncated(usize),
    /// The payload encodes a call other than `relayMessage`.
    #[error("unexpected selector {0}, expected relayMessage")]
    UnexpectedSelector(Selector),
    /// The arguments do not decode as `relayMessage` arguments.
    #[error("malformed relayMessage arguments: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    /// A chain id argument does not fit in 64 bits.
    #[error("{field} chain id {value} does not fit in 64 bits")]
    ChainIdOverflow {
        /// The argument name.
        field: &'static str,
        /// The raw value.
        value: U256,
    },
    /// The message claims a source chain other than the one it was observed on.
    #[error("message claims source chain {claimed} but was observed on chain {observed}")]
    SourceMismatch {
        /// The source chain id carried in the payload.
        claimed: ChainId,
        /// The chain the log was observed on.
        observed: ChainId,
    },
}

/// A decoded "message sent" instruction.
///
/// The messenger emits this as an anonymous log whose data is the ABI encoding of the
/// `relayMessage` call that executes it on the destination chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// The chain the message must be executed on.
    pub destination: ChainId,
    /// The chain the message was sent from.
    pub source: ChainId,
    /// The messenger nonce of the message.
    pub nonce: U256,
    /// The account that sent the message.
    pub sender: Address,
    /// The account the message is delivered to.
    pub target: Address,
    /// The calldata delivered to `target`.
    pub message: Bytes,
}

impl SentMessage {
    /// Returns true if the log is a "message sent" log.
    ///
    /// The messenger emits this event without topics. All of its other events carry at least one
    /// indexed topic, so the check is exact.
    pub const fn is_sent_message(topics: &[B256]) -> bool {
        topics.is_empty()
    }

    /// Decodes the payload of a "message sent" log.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let Some(selector) = data.get(..4) else {
            return Err(DecodeError::Truncated(data.len()));
        };
        if selector != relayMessageCall::SELECTOR.as_slice() {
            return Err(DecodeError::UnexpectedSelector(Selector::from_slice(selector)));
        }

        let call = relayMessageCall::abi_decode(data)?;
        let chain_id = |field: &'static str, value: U256| {
            u64::try_from(value).map_err(|_| DecodeError::ChainIdOverflow { field, value })
        };

        Ok(Self {
            destination: chain_id("destination", call._destination)?,
            source: chain_id("source", call._source)?,
            nonce: call._nonce,
            sender: call._sender,
            target: call._target,
            message: call._message,
        })
    }

    /// Ensures the message was observed on the chain it claims to originate from.
    pub fn ensure_source(&self, observed: ChainId) -> Result<(), DecodeError> {
        if self.source != observed {
            return Err(DecodeError::SourceMismatch { claimed: self.source, observed });
        }
        Ok(())
    }

    /// Returns the hash the messenger keys this message by, as emitted in its
    /// `RelayedMessage` and `FailedRelayedMessage` events.
    pub fn message_hash(&self) -> B256 {
        keccak256(
            (
                U256::from(self.destination),
                U256::from(self.source),
                self.nonce,
                self.sender,
                self.target,
                self.message.clone(),
            )
                .abi_encode_params(),
        )
    }

    /// ABI encodes the message back into its `relayMessage` call.
    pub fn abi_encode(&self) -> Bytes {
        relayMessageCall {
            _destination: U256::from(self.destination),
            _source: U256::from(self.source),
            _nonce: self.nonce,
            _sender: self.sender,
            _target: self.target,
            _message: self.message.clone(),
        }
        .abi_encode()
        .into()
    }
}

/// An `executeMessage` request against a destination `CrossL2Inbox`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteMessage {
    /// The identifier of the initiating log.
    pub identifier: MessageIdentifier,
    /// The account the inbox calls with `message`.
    pub target: Address,
    /// The payload of the initiating log.
    pub message: Bytes,
}

impl ExecuteMessage {
    /// Creates a new [`ExecuteMessage`].
    pub const fn new(identifier: MessageIdentifier, target: Address, message: Bytes) -> Self {
        Self { identifier, target, message }
    }

    /// Returns the hash of the message payload, as checked by `validateMessage`.
    pub fn payload_hash(&self) -> B256 {
        keccak256(&self.message)
    }

    /// Returns the calldata for `executeMessage(identifier, target, message)`.
    pub fn calldata(&self) -> Bytes {
        ICrossL2Inbox::executeMessageCall {
            _id: self.identifier.into(),
            _target: self.target,
            _message: self.message.clone(),
        }
        .abi_encode()
        .into()
    }

    /// Returns the calldata for `validateMessage(identifier, keccak256(message))`.
    pub fn validate_calldata(&self) -> Bytes {
        ICrossL2Inbox::validateMessageCall {
            _id: self.identifier.into(),
            _msgHash: self.payload_hash(),
        }
        .abi_encode()
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS;
    use alloy_primitives::{address, bytes};
    use rstest::rstest;

    fn sample_message() -> SentMessage {
        SentMessage {
            destination: 20,
            source: 10,
            nonce: U256::from(7),
            sender: address!("0x000000000000000000000000000000000000beef"),
            target: address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"),
            message: bytes!("beef"),
        }
    }

    #[test]
    fn test_decode_relay_message_payload() {
        let msg = sample_message();
        let decoded = SentMessage::decode(&msg.abi_encode()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let err = SentMessage::decode(&[0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated(2)));
    }

    #[test]
    fn test_decode_rejects_foreign_selector() {
        let calldata = ExecuteMessage::new(
            MessageIdentifier {
                origin: L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
                block_number: 1,
                log_index: 0,
                timestamp: 1,
                chain_id: 10,
            },
            Address::ZERO,
            Bytes::new(),
        )
        .calldata();

        let err = SentMessage::decode(&calldata).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnexpectedSelector(s) if s == ICrossL2Inbox::executeMessageCall::SELECTOR
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_arguments() {
        let encoded = sample_message().abi_encode();
        let err = SentMessage::decode(&encoded[..68]).unwrap_err();
        assert!(matches!(err, DecodeError::Abi(_)));
    }

    #[test]
    fn test_decode_rejects_wide_chain_id() {
        let call = relayMessageCall {
            _destination: U256::MAX,
            _source: U256::from(10),
            _nonce: U256::ZERO,
            _sender: Address::ZERO,
            _target: Address::ZERO,
            _message: Bytes::new(),
        };

        let err = SentMessage::decode(&call.abi_encode()).unwrap_err();
        assert!(matches!(err, DecodeError::ChainIdOverflow { field: "destination", .. }));
    }

    #[rstest]
    #[case(10, true)]
    #[case(11, false)]
    fn test_ensure_source(#[case] observed: ChainId, #[case] ok: bool) {
        assert_eq!(sample_message().ensure_source(observed).is_ok(), ok);
    }

    #[test]
    fn test_message_hash_depends_on_every_field() {
        let base = sample_message();
        let mut other = base.clone();
        other.nonce = U256::from(8);
        assert_ne!(base.message_hash(), other.message_hash());
        assert_eq!(base.message_hash(), sample_message().message_hash());
    }

    #[test]
    fn test_identifier_abi_conversion() {
        let id = MessageIdentifier {
            origin: L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            block_number: 1000,
            log_index: 2,
            timestamp: 1_700_000_000,
            chain_id: 10,
        };

        let abi: Identifier = id.into();
        assert_eq!(abi.blockNumber, U256::from(1000));
        assert_eq!(abi.chainId, U256::from(10));
        assert_eq!(MessageIdentifier::try_from(abi).unwrap(), id);
    }

    #[test]
    fn test_identifier_overflow() {
        let abi = Identifier {
            origin: Address::ZERO,
            blockNumber: U256::ZERO,
            logIndex: U256::MAX,
            timestamp: U256::ZERO,
            chainId: U256::ZERO,
        };

        let err = MessageIdentifier::try_from(abi).unwrap_err();
        assert_eq!(err.field, "logIndex");
    }

    #[test]
    fn test_execute_message_calldata_roundtrips_arguments() {
        let id = MessageIdentifier {
            origin: L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
            block_number: 1000,
            log_index: 2,
            timestamp: 1_700_000_000,
            chain_id: 10,
        };
        let request =
            ExecuteMessage::new(id, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS, bytes!("beef"));

        let call = ICrossL2Inbox::executeMessageCall::abi_decode(&request.calldata()).unwrap();
        assert_eq!(call._id, id.into());
        assert_eq!(call._target, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS);
        assert_eq!(call._message, bytes!("beef"));

        let call = ICrossL2Inbox::validateMessageCall::abi_decode(&request.validate_calldata())
            .unwrap();
        assert_eq!(call._msgHash, keccak256(bytes!("beef")));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_identifier_serde_camel_case() {
        let id = MessageIdentifier {
            origin: Address::ZERO,
            block_number: 1,
            log_index: 2,
            timestamp: 3,
            chain_id: 4,
        };
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json["blockNumber"], 1);
        assert_eq!(json["chainId"], 4);
    }
}
