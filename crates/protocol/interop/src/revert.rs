//! Rejection reasons of the `CrossL2Inbox`.

use crate::ICrossL2Inbox::ICrossL2InboxErrors;
use alloy_primitives::Bytes;
use alloy_sol_types::SolInterface;
use derive_more::Display;

/// The reason a `CrossL2Inbox` call reverted.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum InboxRevert {
    /// The identifier chain id is not part of the dependency set.
    #[display("invalid chain id")]
    InvalidChainId,
    /// The identifier timestamp is ahead of the executing block.
    #[display("invalid timestamp")]
    InvalidTimestamp,
    /// The inbox was read outside of an execution context.
    #[display("not entered")]
    NotEntered,
    /// `executeMessage` was re-entered.
    #[display("reentrant call")]
    ReentrantCall,
    /// The call to the message target failed.
    #[display("target call failed")]
    TargetCallFailed,
    /// Revert data that does not match any inbox error.
    #[display("unknown revert {_0}")]
    Unknown(Bytes),
}

impl InboxRevert {
    /// Classifies raw revert data.
    pub fn decode(data: &[u8]) -> Self {
        match ICrossL2InboxErrors::abi_decode(data) {
            Ok(ICrossL2InboxErrors::InvalidChainId(_)) => Self::InvalidChainId,
            Ok(ICrossL2InboxErrors::InvalidTimestamp(_)) => Self::InvalidTimestamp,
            Ok(ICrossL2InboxErrors::NotEntered(_)) => Self::NotEntered,
            Ok(ICrossL2InboxErrors::ReentrantCall(_)) => Self::ReentrantCall,
            Ok(ICrossL2InboxErrors::TargetCallFailed(_)) => Self::TargetCallFailed,
            Err(_) => Self::Unknown(Bytes::copy_from_slice(data)),
        }
    }

    /// Returns a short, stable label for the reason.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidChainId => "invalid_chain_id",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::NotEntered => "not_entered",
            Self::ReentrantCall => "reentrant_call",
            Self::TargetCallFailed => "target_call_failed",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ICrossL2Inbox;
    use alloy_sol_types::SolError;
    use rstest::rstest;

    #[rstest]
    #[case(ICrossL2Inbox::InvalidChainId {}.abi_encode(), InboxRevert::InvalidChainId)]
    #[case(ICrossL2Inbox::InvalidTimestamp {}.abi_encode(), InboxRevert::InvalidTimestamp)]
    #[case(ICrossL2Inbox::NotEntered {}.abi_encode(), InboxRevert::NotEntered)]
    #[case(ICrossL2Inbox::ReentrantCall {}.abi_encode(), InboxRevert::ReentrantCall)]
    #[case(ICrossL2Inbox::TargetCallFailed {}.abi_encode(), InboxRevert::TargetCallFailed)]
    fn test_decode_known_reasons(#[case] data: Vec<u8>, #[case] expected: InboxRevert) {
        assert_eq!(InboxRevert::decode(&data), expected);
    }

    #[test]
    fn test_decode_unknown_reason() {
        let data = [0xde, 0xad, 0xbe, 0xef];
        let reason = InboxRevert::decode(&data);
        assert_eq!(reason, InboxRevert::Unknown(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef])));
        assert_eq!(reason.label(), "unknown");
    }

    #[test]
    fn test_decode_empty_revert() {
        assert!(matches!(InboxRevert::decode(&[]), InboxRevert::Unknown(data) if data.is_empty()));
    }
}
