use alloy_primitives::ChainId;
use std::time::Duration;

/// Container for the relayer metrics.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const MESSAGES_OBSERVED_TOTAL: &'static str =
        "kona_relayer_messages_observed_total";
    pub(crate) const DECODE_ERRORS_TOTAL: &'static str = "kona_relayer_decode_errors_total";
    pub(crate) const RELAY_SUBMITTED_TOTAL: &'static str = "kona_relayer_relay_submitted_total";
    pub(crate) const RELAY_CONFIRMED_TOTAL: &'static str = "kona_relayer_relay_confirmed_total";
    pub(crate) const RELAY_FAILED_TOTAL: &'static str = "kona_relayer_relay_failed_total";
    pub(crate) const RELAY_DURATION_SECONDS: &'static str = "kona_relayer_relay_duration_seconds";
    pub(crate) const LIFECYCLE_EVENTS_TOTAL: &'static str = "kona_relayer_lifecycle_events_total";

    /// Describes the relayer metrics and zeroes the per-chain series.
    pub(crate) fn init(chain_ids: &[ChainId]) {
        Self::describe();
        for chain_id in chain_ids {
            Self::zero(*chain_id);
        }
    }

    fn describe() {
        metrics::describe_counter!(
            Self::MESSAGES_OBSERVED_TOTAL,
            metrics::Unit::Count,
            "Total number of sent messages observed on a source chain",
        );

        metrics::describe_counter!(
            Self::DECODE_ERRORS_TOTAL,
            metrics::Unit::Count,
            "Total number of messenger logs that could not be decoded",
        );

        metrics::describe_counter!(
            Self::RELAY_SUBMITTED_TOTAL,
            metrics::Unit::Count,
            "Total number of executing transactions submitted",
        );

        metrics::describe_counter!(
            Self::RELAY_CONFIRMED_TOTAL,
            metrics::Unit::Count,
            "Total number of executing transactions confirmed successfully",
        );

        metrics::describe_counter!(
            Self::RELAY_FAILED_TOTAL,
            metrics::Unit::Count,
            "Total number of relay attempts that failed, by reason",
        );

        metrics::describe_histogram!(
            Self::RELAY_DURATION_SECONDS,
            metrics::Unit::Seconds,
            "Time from observing a sent message to confirming its execution",
        );

        metrics::describe_counter!(
            Self::LIFECYCLE_EVENTS_TOTAL,
            metrics::Unit::Count,
            "Total number of messenger lifecycle events observed, by event",
        );
    }

    fn zero(chain_id: ChainId) {
        let chain_id = chain_id.to_string();
        metrics::counter!(Self::MESSAGES_OBSERVED_TOTAL, "chain_id" => chain_id.clone())
            .increment(0);
        metrics::counter!(Self::DECODE_ERRORS_TOTAL, "chain_id" => chain_id.clone()).increment(0);
        metrics::counter!(Self::RELAY_SUBMITTED_TOTAL, "chain_id" => chain_id.clone())
            .increment(0);
        metrics::counter!(Self::RELAY_CONFIRMED_TOTAL, "chain_id" => chain_id).increment(0);
    }

    pub(crate) fn record_observed(chain_id: ChainId) {
        metrics::counter!(Self::MESSAGES_OBSERVED_TOTAL, "chain_id" => chain_id.to_string())
            .increment(1);
    }

    pub(crate) fn record_decode_error(chain_id: ChainId) {
        metrics::counter!(Self::DECODE_ERRORS_TOTAL, "chain_id" => chain_id.to_string())
            .increment(1);
    }

    pub(crate) fn record_submitted(destination: ChainId) {
        metrics::counter!(Self::RELAY_SUBMITTED_TOTAL, "chain_id" => destination.to_string())
            .increment(1);
    }

    pub(crate) fn record_confirmed(source: ChainId, destination: ChainId, elapsed: Duration) {
        metrics::counter!(Self::RELAY_CONFIRMED_TOTAL, "chain_id" => destination.to_string())
            .increment(1);
        metrics::histogram!(
            Self::RELAY_DURATION_SECONDS,
            "source" => source.to_string(),
            "destination" => destination.to_string(),
        )
        .record(elapsed.as_secs_f64());
    }

    pub(crate) fn record_failed(destination: ChainId, reason: &'static str) {
        metrics::counter!(
            Self::RELAY_FAILED_TOTAL,
            "chain_id" => destination.to_string(),
            "reason" => reason,
        )
        .increment(1);
    }

    pub(crate) fn record_lifecycle_event(chain_id: ChainId, event: &'static str) {
        metrics::counter!(
            Self::LIFECYCLE_EVENTS_TOTAL,
            "chain_id" => chain_id.to_string(),
            "event" => event,
        )
        .increment(1);
    }
}
