//! Relay engine for OP Stack interop messages.
//!
//! The [`Relayer`] watches the `L2ToL2CrossDomainMessenger` of every chain in a [`ChainRegistry`]
//! and executes each sent message on its destination chain through the `CrossL2Inbox`.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod client;
pub use client::{
    AlloyChainClient, BlockSeal, CallOutcome, ChainClient, ChainReader, InboxWriter,
    LogBatchStream, RelayReceipt,
};

mod config;
pub use config::{Config, ConfigError, RelayConfig};

mod decoder;
pub use decoder::MessageDecoder;

mod dispatcher;
pub use dispatcher::{PendingRelay, RelayDispatcher};

mod error;
pub use error::{ConfirmationError, RegistryError, RelayError, SubmissionError};

mod event_logger;
pub use event_logger::EventLogger;

mod identifier;
pub use identifier::IdentifierBuilder;

mod ledger;
pub use ledger::{AttemptLedger, AttemptStatus, MessageKey, RelayAttempt};

mod metrics;

mod processor;
pub use processor::ChainRelayer;

mod queue;
pub use queue::SubmissionQueue;

mod registry;
pub use registry::{ChainRegistry, DomainHandle};

mod relayer;
pub use relayer::Relayer;

mod retry;
pub use retry::RetryPolicy;

mod task;
pub use task::RelayContext;

mod tracker;
pub use tracker::ReceiptTracker;

mod watcher;
pub use watcher::EventWatcher;

#[cfg(test)]
pub(crate) mod test_utils;
