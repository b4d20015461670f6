//! The collect/buffer/flush scheduler.
//!
//! Ports `core/collector.py`'s `Collector.run()` loop: each cycle collects
//! from every input, injects global tags, appends to the buffer, and gates
//! a flush on `now - last_flush_time >= flush_interval`; a flush drains the
//! buffer only if every sink succeeded, otherwise the buffer is retained
//! for the next attempt (the only difference from the original, which
//! conflated "drop oldest" with "clear after attempting", is made explicit
//! here as the IDLE → COLLECTING → BUFFERED → FLUSHING → CLEARED/RETAINED
//! state progression).

use std::time::{Duration, Instant};

use rtcollector_core::TagInjector;

use crate::buffer::BufferPair;
use crate::collectors::registry::CollectorRegistry;
use crate::router::SinkRouter;

/// Observable phase of one scheduler cycle, named for the transitions the
/// `run_cycle` body passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// A flush was attempted and every sink succeeded; buffers cleared.
    Cleared,
    /// A flush was attempted but at least one sink failed; buffers
    /// retained for the next cycle's attempt.
    Retained,
    /// The flush interval had not yet elapsed; no flush was attempted.
    Idle,
}

/// What one cycle did, for logging and (in one-shot mode) exit-status
/// decisions.
#[derive(Debug)]
pub struct CycleOutcome {
    /// Which phase the cycle ended in.
    pub phase: CyclePhase,
    /// Metrics newly collected this cycle (already tag-injected).
    pub metrics_collected: usize,
    /// Logs newly collected this cycle (already tag-injected).
    pub logs_collected: usize,
    /// Whether a flush was attempted this cycle.
    pub flush_attempted: bool,
    /// Whether the flush (if attempted) fully succeeded.
    pub flush_succeeded: bool,
}

/// Outcome of a `--once` run, used to pick a process exit code.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneShotOutcome {
    /// Whether a flush was attempted.
    pub attempted: bool,
    /// Whether at least one sink write succeeded (or there was nothing to
    /// send, which counts as trivially successful).
    pub any_success: bool,
}

/// Ties the registry, router, buffers, rate helper, and tag injector
/// together into the per-cycle state machine.
pub struct Engine {
    registry: CollectorRegistry,
    router: SinkRouter,
    buffers: BufferPair,
    tag_injector: TagInjector,
    flush_interval: Duration,
    warn_on_buffer: bool,
    last_flush: Instant,
}

impl Engine {
    /// Build an engine from its already-configured components.
    #[must_use]
    pub fn new(
        registry: CollectorRegistry,
        router: SinkRouter,
        buffers: BufferPair,
        tag_injector: TagInjector,
        flush_interval: Duration,
    ) -> Self {
        Self::with_overflow_warning(registry, router, buffers, tag_injector, flush_interval, true)
    }

    /// Build an engine, explicitly choosing whether drop-oldest overflow
    /// logs a warning.
    #[must_use]
    pub fn with_overflow_warning(
        registry: CollectorRegistry,
        router: SinkRouter,
        buffers: BufferPair,
        tag_injector: TagInjector,
        flush_interval: Duration,
        warn_on_buffer: bool,
    ) -> Self {
        Self {
            registry,
            router,
            buffers,
            tag_injector,
            flush_interval,
            warn_on_buffer,
            last_flush: Instant::now(),
        }
    }

    /// Start every registered collector's background resources.
    ///
    /// # Errors
    /// Propagates the first collector `start` error.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.registry.start_all().await
    }

    /// Stop every registered collector's background resources.
    pub async fn shutdown(&mut self) {
        self.registry.stop_all().await;
    }

    /// Run one cycle: collect, tag, buffer, and flush if the interval has
    /// elapsed.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        tracing::debug!("cycle start");
        let (mut batch, diagnostics) = self.registry.collect_cycle().await;
        for metric in &mut batch.metrics {
            self.tag_injector.inject_metric(metric);
        }
        for log in &mut batch.logs {
            self.tag_injector.inject_log(log);
        }
        let mut logs = batch.logs;
        logs.extend(diagnostics);

        let metrics_collected = batch.metrics.len();
        let logs_collected = logs.len();
        self.buffers.append_metrics(batch.metrics);
        self.buffers.append_logs(logs);

        let (m, l) = self.buffers.occupancy();
        let (max_m, max_l) = self.buffers.capacity();
        tracing::debug!(buffered_metrics = m, max_m, buffered_logs = l, max_l, "cycle buffered");

        if self.last_flush.elapsed() < self.flush_interval {
            return CycleOutcome {
                phase: CyclePhase::Idle,
                metrics_collected,
                logs_collected,
                flush_attempted: false,
                flush_succeeded: false,
            };
        }

        let outcome = self.flush_now().await;
        CycleOutcome {
            phase: if outcome.all_succeeded {
                CyclePhase::Cleared
            } else {
                CyclePhase::Retained
            },
            metrics_collected,
            logs_collected,
            flush_attempted: true,
            flush_succeeded: outcome.all_succeeded,
        }
    }

    /// Flush unconditionally, regardless of the flush interval. Used by
    /// `run_cycle` at the interval boundary and by one-shot mode.
    async fn flush_now(&mut self) -> crate::router::FlushOutcome {
        let overflow = self.buffers.enforce_capacity();
        if self.warn_on_buffer && (overflow.metrics > 0 || overflow.logs > 0) {
            tracing::warn!(
                dropped_metrics = overflow.metrics,
                dropped_logs = overflow.logs,
                "buffer overflow, dropped oldest entries"
            );
        }

        let (metrics, logs) = self.buffers.snapshot();
        let outcome = self.router.flush(metrics, logs).await;

        if outcome.all_succeeded {
            self.buffers.clear();
            self.last_flush = Instant::now();
        } else {
            tracing::warn!("flush incomplete, retaining buffered data for next attempt");
        }
        outcome
    }

    /// Run a single collect-then-unconditionally-flush cycle and exit,
    /// matching `main.py`'s `--once` mode.
    pub async fn run_once(&mut self) -> OneShotOutcome {
        let (mut batch, diagnostics) = self.registry.collect_cycle().await;
        for metric in &mut batch.metrics {
            self.tag_injector.inject_metric(metric);
        }
        for log in &mut batch.logs {
            self.tag_injector.inject_log(log);
        }
        let mut logs = batch.logs;
        logs.extend(diagnostics);
        self.buffers.append_metrics(batch.metrics);
        self.buffers.append_logs(logs);

        if self.buffers.is_empty() {
            return OneShotOutcome {
                attempted: false,
                any_success: true,
            };
        }

        let outcome = self.flush_now().await;
        OneShotOutcome {
            attempted: true,
            any_success: outcome.any_succeeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rtcollector_core::Metric;

    use super::*;
    use crate::collectors::{Batch as CBatch, Collector};
    use crate::sinks::{Capability, Sink};

    struct OneMetric;
    #[async_trait]
    impl Collector for OneMetric {
        fn name(&self) -> &str {
            "one"
        }
        async fn collect(&mut self) -> anyhow::Result<CBatch> {
            Ok(CBatch::from_metrics(vec![Metric::unlabeled("m", 1.0).unwrap()]))
        }
    }

    struct Collects(std::sync::Arc<tokio::sync::Mutex<Vec<Metric>>>);
    #[async_trait]
    impl Sink for Collects {
        fn name(&self) -> &str {
            "collects"
        }
        fn capability(&self) -> Capability {
            Capability::BOTH
        }
        async fn write_metrics(&self, metrics: &[Metric]) -> anyhow::Result<()> {
            self.0.lock().await.extend_from_slice(metrics);
            Ok(())
        }
    }

    fn build_engine(flush_interval: Duration) -> (Engine, std::sync::Arc<tokio::sync::Mutex<Vec<Metric>>>) {
        let mut registry = CollectorRegistry::new();
        registry.register("one", Box::new(OneMetric));
        let received = std::sync::Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let router = SinkRouter::new(vec![Box::new(Collects(received.clone()))], vec![], vec![]);
        let buffers = BufferPair::new(100, 100);
        let engine = Engine::new(
            registry,
            router,
            buffers,
            TagInjector::default(),
            flush_interval,
        );
        (engine, received)
    }

    /// With a flush interval long enough that the first cycle never
    /// reaches it, no flush happens and the sink sees nothing.
    #[tokio::test]
    async fn cycle_stays_idle_before_flush_interval_elapses() {
        let (mut engine, received) = build_engine(Duration::from_secs(3600));
        let outcome = engine.run_cycle().await;
        assert_eq!(outcome.phase, CyclePhase::Idle);
        assert!(received.lock().await.is_empty());
    }

    /// A zero flush interval means every cycle flushes immediately,
    /// clearing the buffer on success.
    #[tokio::test]
    async fn zero_flush_interval_flushes_every_cycle() {
        let (mut engine, received) = build_engine(Duration::from_secs(0));
        let outcome = engine.run_cycle().await;
        assert_eq!(outcome.phase, CyclePhase::Cleared);
        assert_eq!(received.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn run_once_reports_no_attempt_when_nothing_collected() {
        let mut registry = CollectorRegistry::new();
        registry.register("none", Box::new(NoOp));
        let router = SinkRouter::new(vec![], vec![], vec![]);
        let buffers = BufferPair::new(100, 100);
        let mut engine = Engine::new(registry, router, buffers, TagInjector::default(), Duration::from_secs(60));
        let outcome = engine.run_once().await;
        assert!(!outcome.attempted);
        assert!(outcome.any_success);
    }

    struct NoOp;
    #[async_trait]
    impl Collector for NoOp {
        fn name(&self) -> &str {
            "none"
        }
        async fn collect(&mut self) -> anyhow::Result<CBatch> {
            Ok(CBatch::empty())
        }
    }

    struct AlwaysFails;
    #[async_trait]
    impl Sink for AlwaysFails {
        fn name(&self) -> &str {
            "always-fails"
        }
        fn capability(&self) -> Capability {
            Capability::BOTH
        }
        async fn write_metrics(&self, _metrics: &[Metric]) -> anyhow::Result<()> {
            anyhow::bail!("down")
        }
    }

    /// One-shot exit-code decision: a partially-successful flush (one sink
    /// of two wrote its batch) must still report `any_success`, even though
    /// the same outcome would leave the daemon-mode buffer retained rather
    /// than cleared.
    #[tokio::test]
    async fn run_once_reports_success_when_one_of_two_sinks_succeeds() {
        let mut registry = CollectorRegistry::new();
        registry.register("one", Box::new(OneMetric));
        let received = std::sync::Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let router = SinkRouter::new(
            vec![Box::new(AlwaysFails), Box::new(Collects(received.clone()))],
            vec![],
            vec![],
        );
        let buffers = BufferPair::new(100, 100);
        let mut engine = Engine::new(registry, router, buffers, TagInjector::default(), Duration::from_secs(60));
        let outcome = engine.run_once().await;
        assert!(outcome.attempted);
        assert!(outcome.any_success);
        assert_eq!(received.lock().await.len(), 1);
    }

    /// Conversely, when every sink fails the one-shot run must report
    /// failure so the process exits non-zero.
    #[tokio::test]
    async fn run_once_reports_failure_when_all_sinks_fail() {
        let mut registry = CollectorRegistry::new();
        registry.register("one", Box::new(OneMetric));
        let router = SinkRouter::new(vec![Box::new(AlwaysFails)], vec![], vec![]);
        let buffers = BufferPair::new(100, 100);
        let mut engine = Engine::new(registry, router, buffers, TagInjector::default(), Duration::from_secs(60));
        let outcome = engine.run_once().await;
        assert!(outcome.attempted);
        assert!(!outcome.any_success);
    }
}
