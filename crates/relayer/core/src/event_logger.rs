//! Reporting of messenger lifecycle events.

use crate::metrics::Metrics;
use alloy_primitives::ChainId;
use alloy_rpc_types_eth::Log;
use kona_interop::MessengerEvent;
use tracing::info;

/// Reports `RelayedMessage` and `FailedRelayedMessage` events seen on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLogger {
    chain_id: ChainId,
}

impl EventLogger {
    /// Creates a logger for events observed on `chain_id`.
    pub const fn new(chain_id: ChainId) -> Self {
        Self { chain_id }
    }

    /// Logs every lifecycle event in `logs` and returns them in order.
    ///
    /// Other logs are ignored.
    pub fn log_batch(&self, logs: &[Log]) -> Vec<MessengerEvent> {
        logs.iter()
            .filter_map(|log| {
                let event = MessengerEvent::parse(&log.inner)?;
                info!(
                    target: "relayer::events",
                    chain_id = self.chain_id,
                    block_number = ?log.block_number,
                    tx_hash = ?log.transaction_hash,
                    message_hash = %event.message_hash(),
                    "Emitted: {}",
                    event.name()
                );
                Metrics::record_lifecycle_event(self.chain_id, event.name());
                Some(event)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sent_message, sent_message_log};
    use alloy_primitives::B256;
    use alloy_sol_types::SolEvent;
    use kona_interop::{
        IL2ToL2CrossDomainMessenger::{FailedRelayedMessage, RelayedMessage},
        L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS,
    };

    fn event_log(data: alloy_primitives::LogData) -> Log {
        Log {
            inner: alloy_primitives::Log { address: L2_TO_L2_CROSS_DOMAIN_MESSENGER_ADDRESS, data },
            block_number: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_reports_lifecycle_events_only() {
        let relayed = B256::repeat_byte(0x01);
        let failed = B256::repeat_byte(0x02);
        let logs = vec![
            event_log(RelayedMessage { messageHash: relayed }.encode_log_data()),
            sent_message_log(&sent_message(901, 902, 0), B256::ZERO, 7, 1),
            event_log(FailedRelayedMessage { messageHash: failed }.encode_log_data()),
        ];

        let events = EventLogger::new(902).log_batch(&logs);
        assert_eq!(
            events,
            vec![
                MessengerEvent::Relayed { message_hash: relayed },
                MessengerEvent::Failed { message_hash: failed },
            ]
        );
    }
}
