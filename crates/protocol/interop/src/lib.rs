//! Contract bindings and message primitives for relaying OP Stack interop messages.
//!
//! A message is initiated on a source chain by the `L2ToL2CrossDomainMessenger`, which emits an
//! anonymous log carrying the `relayMessage` call. It is executed on the destination chain by
//! submitting that payload, together with a [`MessageIdentifier`] pointing at the source log, to
//! the `CrossL2Inbox`.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod bindings;
pub use bindings::{ICrossL2Inbox, IL2ToL2CrossDomainMessenger};

mod constants;
pub use constants::{CROSS_L2_INBOX_ADDRESS, L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS};

mod message;
pub use message::{DecodeError, ExecuteMessage, IdentifierOverflow, MessageIdentifier, SentMessage};

mod events;
pub use events::{ExecutedMessage, MessengerEvent};

mod revert;
pub use revert::InboxRevert;
