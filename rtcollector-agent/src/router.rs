//! Sink fan-out: flushes buffered metrics and logs to every configured sink,
//! isolating one sink's failure from the rest.
//!
//! Ports `core/collector.py`'s flush loop: it iterates `self.outputs`,
//! `self.metrics_only_outputs`, and `self.logs_only_outputs`, wrapping each
//! call in its own `try/except` so one broken output does not lose delivery
//! to the others, then gates buffer-clearing on every attempted write
//! having succeeded.

use rtcollector_core::{LogLevel, LogRecord, Metric};

use crate::sinks::Sink;

/// Result of one flush attempt across every configured sink.
#[derive(Debug, Default)]
pub struct FlushOutcome {
    /// Whether every sink that was asked to write succeeded.
    pub all_succeeded: bool,
    /// Whether at least one sink write succeeded (distinct from
    /// `all_succeeded`: one-shot mode's exit code cares about partial
    /// delivery, the engine's clear-vs-retain decision does not).
    pub any_succeeded: bool,
    /// Diagnostic log records describing per-sink failures, for the
    /// caller to fold into the next cycle's log batch.
    pub diagnostics: Vec<LogRecord>,
}

/// Holds the three sink groups and drives a flush across all of them.
#[derive(Default)]
pub struct SinkRouter {
    outputs: Vec<Box<dyn Sink>>,
    metrics_only_outputs: Vec<Box<dyn Sink>>,
    logs_only_outputs: Vec<Box<dyn Sink>>,
}

impl SinkRouter {
    /// Build a router from its three sink groups.
    #[must_use]
    pub fn new(
        outputs: Vec<Box<dyn Sink>>,
        metrics_only_outputs: Vec<Box<dyn Sink>>,
        logs_only_outputs: Vec<Box<dyn Sink>>,
    ) -> Self {
        Self {
            outputs,
            metrics_only_outputs,
            logs_only_outputs,
        }
    }

    /// Flush `metrics` and `logs` to every configured sink according to its
    /// [`crate::sinks::Capability`], metrics before logs for a sink that
    /// accepts both. One sink's error is isolated and does not stop the
    /// others; `all_succeeded` reflects whether every attempted write across
    /// every sink succeeded.
    pub async fn flush(&self, metrics: &[Metric], logs: &[LogRecord]) -> FlushOutcome {
        let mut outcome = FlushOutcome {
            all_succeeded: true,
            any_succeeded: false,
            diagnostics: Vec::new(),
        };

        for sink in self
            .outputs
            .iter()
            .chain(self.metrics_only_outputs.iter())
            .chain(self.logs_only_outputs.iter())
        {
            let cap = sink.capability();
            if cap.metrics && !metrics.is_empty() {
                match sink.write_metrics(metrics).await {
                    Ok(()) => {
                        tracing::debug!(sink = sink.name(), count = metrics.len(), "wrote metrics");
                        outcome.any_succeeded = true;
                    }
                    Err(err) => record_failure(&mut outcome, sink.as_ref(), "metrics", &err),
                }
            }
            if cap.logs && !logs.is_empty() {
                match sink.write_logs(logs).await {
                    Ok(()) => {
                        tracing::debug!(sink = sink.name(), count = logs.len(), "wrote logs");
                        outcome.any_succeeded = true;
                    }
                    Err(err) => record_failure(&mut outcome, sink.as_ref(), "logs", &err),
                }
            }
        }

        outcome
    }
}

fn record_failure(outcome: &mut FlushOutcome, sink: &dyn Sink, kind: &str, err: &anyhow::Error) {
    outcome.all_succeeded = false;
    tracing::error!(sink = sink.name(), kind, error = %err, "sink write failed");
    outcome.diagnostics.push(
        LogRecord::at(
            LogLevel::Error,
            format!("sink '{}' failed to write {kind}: {err}", sink.name()),
        )
        .with_tag("sink", sink.name()),
    );
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rtcollector_core::Metric;

    use super::*;
    use crate::sinks::Capability;

    struct FailingSink;
    #[async_trait]
    impl Sink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }
        fn capability(&self) -> Capability {
            Capability::BOTH
        }
        async fn write_metrics(&self, _metrics: &[Metric]) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    struct SucceedingSink;
    #[async_trait]
    impl Sink for SucceedingSink {
        fn name(&self) -> &str {
            "ok"
        }
        fn capability(&self) -> Capability {
            Capability::BOTH
        }
    }

    /// One sink failing does not stop delivery to the others, and is
    /// reflected in `all_succeeded`.
    #[tokio::test]
    async fn one_sink_failure_does_not_block_others() {
        let router = SinkRouter::new(
            vec![Box::new(FailingSink), Box::new(SucceedingSink)],
            vec![],
            vec![],
        );
        let metrics = vec![Metric::unlabeled("m", 1.0).unwrap()];
        let outcome = router.flush(&metrics, &[]).await;
        assert!(!outcome.all_succeeded);
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn all_succeed_when_every_sink_succeeds() {
        let router = SinkRouter::new(vec![Box::new(SucceedingSink)], vec![], vec![]);
        let outcome = router.flush(&[], &[]).await;
        assert!(outcome.all_succeeded);
        assert!(outcome.diagnostics.is_empty());
    }
}
