use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

/// Counters for the outbound message path.
#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub(crate) emitted: Counter,
    pub(crate) dropped: Counter,
    pub(crate) failed: Counter,
}

impl Metrics {
    pub fn register(prom: &mut Registry) -> Self {
        let metrics = Self::default();

        prom.register(
            "messages_emitted",
            "Count of route messages published to the transport",
            metrics.emitted.clone(),
        );
        prom.register(
            "messages_dropped",
            "Count of route messages dropped on a full outbound buffer",
            metrics.dropped.clone(),
        );
        prom.register(
            "messages_failed",
            "Count of route messages that failed to publish",
            metrics.failed.clone(),
        );

        metrics
    }
}
