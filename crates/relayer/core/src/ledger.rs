//! In-memory record of relay attempts.

use alloy_primitives::{ChainId, TxHash};
use alloy_rpc_types_eth::Log;
use derive_more::Display;
use kona_interop::MessageIdentifier;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::trace;

/// Position of a sent message on its source chain.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("{chain_id}:{block_number}:{log_index}")]
pub struct MessageKey {
    /// The source chain id.
    pub chain_id: ChainId,
    /// The number of the block that contains the log.
    pub block_number: u64,
    /// The index of the log in the block.
    pub log_index: u64,
}

impl MessageKey {
    /// Builds the key of a log observed on `chain_id`.
    ///
    /// Returns `None` for pending logs, which have no position yet.
    pub const fn from_log(chain_id: ChainId, log: &Log) -> Option<Self> {
        match (log.block_number, log.log_index) {
            (Some(block_number), Some(log_index)) => {
                Some(Self { chain_id, block_number, log_index })
            }
            _ => None,
        }
    }
}

/// Lifecycle state of a relay attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptStatus {
    /// Observed and decoded, not yet submitted.
    Pending,
    /// The executing transaction was accepted by the destination node.
    Submitted {
        /// The executing transaction.
        tx_hash: TxHash,
    },
    /// The executing transaction succeeded.
    Confirmed {
        /// The executing transaction.
        tx_hash: TxHash,
        /// The block that included it.
        block_number: u64,
    },
    /// The attempt ended with an error.
    Failed {
        /// Description of the error.
        reason: String,
    },
    /// The attempt was still running when the relayer shut down.
    Abandoned,
}

impl AttemptStatus {
    /// Returns `true` if the attempt will not make further progress.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed { .. } | Self::Failed { .. } | Self::Abandoned)
    }
}

/// A relay attempt of one sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayAttempt {
    /// The position of the sent message.
    pub key: MessageKey,
    /// The destination chain id.
    pub destination: ChainId,
    /// The identifier, once built.
    pub identifier: Option<MessageIdentifier>,
    /// The current state.
    pub status: AttemptStatus,
}

/// Tracks every relay attempt made by this process.
///
/// A message gets at most one attempt per process lifetime. Nothing is persisted; a restarted
/// relayer relies on the destination messenger to reject messages it already relayed.
#[derive(Debug, Default)]
pub struct AttemptLedger {
    attempts: Mutex<HashMap<MessageKey, RelayAttempt>>,
}

impl AttemptLedger {
    /// Records a new attempt in the [`AttemptStatus::Pending`] state.
    ///
    /// Returns `false`, leaving the ledger untouched, if the message was already attempted.
    pub fn begin(&self, key: MessageKey, destination: ChainId) -> bool {
        let mut attempts = self.attempts();
        if attempts.contains_key(&key) {
            return false;
        }
        attempts.insert(
            key,
            RelayAttempt { key, destination, identifier: None, status: AttemptStatus::Pending },
        );
        true
    }

    /// Stores the identifier built for an attempt.
    pub fn set_identifier(&self, key: MessageKey, identifier: MessageIdentifier) {
        if let Some(attempt) = self.attempts().get_mut(&key) {
            attempt.identifier = Some(identifier);
        }
    }

    /// Moves an attempt to [`AttemptStatus::Submitted`].
    pub fn mark_submitted(&self, key: MessageKey, tx_hash: TxHash) {
        self.transition(key, AttemptStatus::Submitted { tx_hash });
    }

    /// Moves an attempt to [`AttemptStatus::Confirmed`].
    pub fn mark_confirmed(&self, key: MessageKey, tx_hash: TxHash, block_number: u64) {
        self.transition(key, AttemptStatus::Confirmed { tx_hash, block_number });
    }

    /// Moves an attempt to [`AttemptStatus::Failed`].
    pub fn mark_failed(&self, key: MessageKey, reason: impl ToString) {
        self.transition(key, AttemptStatus::Failed { reason: reason.to_string() });
    }

    /// Marks every unfinished attempt sourced from `chain_id` as abandoned.
    ///
    /// Returns the number of abandoned attempts.
    pub fn abandon_unfinished(&self, chain_id: ChainId) -> usize {
        let mut attempts = self.attempts();
        let mut abandoned = 0;
        for attempt in attempts.values_mut() {
            if attempt.key.chain_id == chain_id && !attempt.status.is_terminal() {
                attempt.status = AttemptStatus::Abandoned;
                abandoned += 1;
            }
        }
        abandoned
    }

    /// Drops the finished attempts sourced from `chain_id` below block `horizon`.
    ///
    /// Unfinished attempts are kept whatever their age. Returns the number of dropped attempts.
    pub fn prune(&self, chain_id: ChainId, horizon: u64) -> usize {
        let mut attempts = self.attempts();
        let before = attempts.len();
        attempts.retain(|key, attempt| {
            key.chain_id != chain_id || key.block_number >= horizon || !attempt.status.is_terminal()
        });
        before - attempts.len()
    }

    /// Returns a snapshot of an attempt.
    pub fn get(&self, key: &MessageKey) -> Option<RelayAttempt> {
        self.attempts().get(key).cloned()
    }

    /// Returns snapshots of all attempts, ordered by key.
    pub fn attempts_snapshot(&self) -> Vec<RelayAttempt> {
        let mut attempts = self.attempts().values().cloned().collect::<Vec<_>>();
        attempts.sort_unstable_by_key(|attempt| attempt.key);
        attempts
    }

    /// Returns the number of unfinished attempts sourced from `chain_id`.
    pub fn unfinished(&self, chain_id: ChainId) -> usize {
        self.attempts()
            .values()
            .filter(|attempt| attempt.key.chain_id == chain_id && !attempt.status.is_terminal())
            .count()
    }

    fn transition(&self, key: MessageKey, status: AttemptStatus) {
        let mut attempts = self.attempts();
        let Some(attempt) = attempts.get_mut(&key) else {
            return;
        };
        // Terminal states are final.
        if attempt.status.is_terminal() {
            return;
        }
        trace!(target: "relayer::ledger", %key, from = ?attempt.status, to = ?status, "Attempt transition");
        attempt.status = status;
    }

    fn attempts(&self) -> MutexGuard<'_, HashMap<MessageKey, RelayAttempt>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
