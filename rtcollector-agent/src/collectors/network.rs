//! Per-interface network throughput collector.
//!
//! Supplements the Python agent's shipped CPU-only resource input. Raw
//! interface byte counters are monotonic; this collector runs them through
//! the shared [`RateHelper`] (grounded on `utils/metrics.py`) to report
//! bytes/sec rather than a running total, the same counter-to-rate
//! transformation performance metrics need before alerting on them.

use async_trait::async_trait;
use rtcollector_core::{compose_key, Metric, RateHelper};
use sysinfo::Networks;

use super::{Batch, Collector};

/// Collects per-interface received/transmitted bytes-per-second.
pub struct NetworkCollector {
    rate: RateHelper,
}

impl NetworkCollector {
    /// Build a network collector with its own rate-helper state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rate: RateHelper::new(),
        }
    }
}

impl Default for NetworkCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for NetworkCollector {
    fn name(&self) -> &str {
        "network"
    }

    async fn collect(&mut self) -> anyhow::Result<Batch> {
        let networks = Networks::new_with_refreshed_list();
        let now = rtcollector_core::model::now_millis();
        let mut metrics = Vec::new();

        for (iface, data) in &networks {
            let mut rx_labels = std::collections::HashMap::new();
            rx_labels.insert("interface".to_string(), iface.clone());
            let rx_key = compose_key("network_receive_bytes_total", &rx_labels);
            if let Some(rate) = self
                .rate
                .rate(&rx_key, data.total_received() as f64, now, None)
            {
                metrics.push(
                    Metric::new("network_receive_bytes_per_second", rate, Some(now), rx_labels)?,
                );
            }

            let mut tx_labels = std::collections::HashMap::new();
            tx_labels.insert("interface".to_string(), iface.clone());
            let tx_key = compose_key("network_transmit_bytes_total", &tx_labels);
            if let Some(rate) =
                self.rate
                    .rate(&tx_key, data.total_transmitted() as f64, now, None)
            {
                metrics.push(Metric::new(
                    "network_transmit_bytes_per_second",
                    rate,
                    Some(now),
                    tx_labels,
                )?);
            }
        }

        Ok(Batch::from_metrics(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_cycle_yields_no_rate_yet() {
        let mut collector = NetworkCollector::new();
        // First cycle seeds the rate helper; no prior observation exists
        // yet so no metrics are emitted regardless of interface count.
        let batch = collector.collect().await.unwrap();
        assert!(batch.metrics.is_empty());
    }
}
