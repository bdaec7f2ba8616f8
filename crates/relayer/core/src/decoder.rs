//! Extraction of sent messages from messenger logs.

use alloy_primitives::ChainId;
use alloy_rpc_types_eth::Log;
use kona_interop::{DecodeError, SentMessage};

/// Decodes the sent messages observed on one source chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDecoder {
    chain_id: ChainId,
}

impl MessageDecoder {
    /// Creates a decoder for logs observed on `chain_id`.
    pub const fn new(chain_id: ChainId) -> Self {
        Self { chain_id }
    }

    /// Decodes a messenger log.
    ///
    /// Returns `Ok(None)` for logs that do not announce a sent message, such as lifecycle events.
    /// A sent message that claims a different source chain is rejected.
    pub fn decode(&self, log: &Log) -> Result<Option<SentMessage>, DecodeError> {
        if !SentMessage::is_sent_message(log.topics()) {
            return Ok(None);
        }
        let message = SentMessage::decode(&log.inner.data.data)?;
        message.ensure_source(self.chain_id)?;
        Ok(Some(message))
    }
}
