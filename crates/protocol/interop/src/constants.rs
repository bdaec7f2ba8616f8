//! Predeploy addresses used by interop message passing.

use alloy_primitives::{Address, address};

/// The address of the `CrossL2Inbox` predeploy.
///
/// Every chain in the dependency set deploys the inbox at this address. Relayers submit
/// `executeMessage` calls against it on the destination chain.
pub const CROSS_L2_INBOX_ADDRESS: Address = address!("0x4200000000000000000000000000000000000022");

/// The address of the `L2ToL2CrossDomainMessenger` predeploy.
///
/// The messenger emits the anonymous "message sent" log on the source chain and is also the
/// target of the relayed execution on the destination chain.
pub const L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS: Address =
    address!("0x4200000000000000000000000000000000000023");
