//! A sink that logs every metric/log line via `tracing`, for local
//! debugging and `--once` runs with no configured outputs.

use async_trait::async_trait;
use rtcollector_core::{LogRecord, Metric};

use super::{Capability, Sink};

/// Writes every item to the `tracing` subscriber at info level rather than
/// any external system.
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn capability(&self) -> Capability {
        Capability::BOTH
    }

    async fn write_metrics(&self, metrics: &[Metric]) -> anyhow::Result<()> {
        for m in metrics {
            tracing::info!(name = %m.name, value = m.value, timestamp = m.timestamp, labels = ?m.labels, "metric");
        }
        Ok(())
    }

    async fn write_logs(&self, logs: &[LogRecord]) -> anyhow::Result<()> {
        for l in logs {
            tracing::info!(level = %l.level, message = %l.message, tags = ?l.tags, "log");
        }
        Ok(())
    }
}
