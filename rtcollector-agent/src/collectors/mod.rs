//! Collector abstraction: the pluggable source side of the agent.
//!
//! Ports `core/collector.py`'s duck-typed "whatever `collect()` hands back"
//! contract into a single tagged return type. The original accepted three
//! shapes at the call site (a `{"x_metrics": [...], "x_logs": [...]}` dict,
//! a `(metrics, logs)` tuple, or a flat list of mixed items) and branched on
//! `isinstance` each cycle; [`Collector::collect`] here returns one
//! canonical [`Batch`] instead, and [`legacy::normalize`] is the one place
//! the three historical shapes get folded into it — for collectors adapted
//! from configuration-driven or external sources rather than written
//! against this trait directly.

pub mod cpu;
pub mod disk;
pub mod exec;
pub mod http_response;
pub mod legacy;
pub mod memory;
pub mod network;
pub mod registry;
pub mod syslog;

use async_trait::async_trait;
use rtcollector_core::{LogRecord, Metric};

/// Everything a single collector cycle produced.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    /// Metrics emitted this cycle, before global tag injection.
    pub metrics: Vec<Metric>,
    /// Log records emitted this cycle, before global tag injection.
    pub logs: Vec<LogRecord>,
}

impl Batch {
    /// An empty batch, for collectors that found nothing to report.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a batch from metrics only.
    #[must_use]
    pub fn from_metrics(metrics: Vec<Metric>) -> Self {
        Self {
            metrics,
            logs: Vec::new(),
        }
    }

    /// Build a batch from logs only.
    #[must_use]
    pub fn from_logs(logs: Vec<LogRecord>) -> Self {
        Self {
            metrics: Vec::new(),
            logs,
        }
    }
}

/// A pluggable telemetry source, invoked once per scheduler cycle.
///
/// Implementations that hold background resources (a listening socket, a
/// spawned thread) should acquire them in [`Collector::start`] and release
/// them in [`Collector::stop`] rather than in `collect` itself, and should
/// report [`Collector::is_persistent`] as `true` so the registry knows the
/// object must survive across cycles rather than being recreated.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Stable name used in configuration, logs, and rate-helper keys.
    fn name(&self) -> &str;

    /// Whether this collector owns long-lived background resources.
    ///
    /// Persistent collectors (for example a syslog listener) are started
    /// once at startup and drained each cycle rather than doing their work
    /// inline inside `collect`.
    fn is_persistent(&self) -> bool {
        false
    }

    /// Acquire any background resources. Called once, before the first
    /// cycle. The default does nothing.
    async fn start(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Produce this cycle's metrics and logs.
    ///
    /// # Errors
    /// Any error here is caught by the invoking adapter, turned into a
    /// diagnostic [`LogRecord`], and does not abort the cycle.
    async fn collect(&mut self) -> anyhow::Result<Batch>;

    /// Release background resources. Called once, during shutdown. The
    /// default does nothing.
    async fn stop(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
