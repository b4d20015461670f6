//! Sink abstraction: the pluggable destination side of the agent.
//!
//! Ports `outputs/redistimeseries.py` and `outputs/redissearch.py`'s shared
//! shape — each output declared whether it wanted metrics, logs, or both by
//! defining (or omitting) `write_metrics`/`write_logs` methods, and
//! `core/collector.py` duck-typed that via `hasattr`. [`Capability`] makes
//! that declaration an explicit pair of booleans instead of a runtime
//! `hasattr` check.

pub mod http_search;
pub mod http_timeseries;
pub mod stdout;

use async_trait::async_trait;
use rtcollector_core::{LogRecord, Metric};

/// What a sink accepts, replacing duck-typed `hasattr` capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Whether [`Sink::write_metrics`] should be called.
    pub metrics: bool,
    /// Whether [`Sink::write_logs`] should be called.
    pub logs: bool,
}

impl Capability {
    /// A sink that accepts both metrics and logs.
    pub const BOTH: Self = Self {
        metrics: true,
        logs: true,
    };
    /// A sink that accepts metrics only.
    pub const METRICS_ONLY: Self = Self {
        metrics: true,
        logs: false,
    };
    /// A sink that accepts logs only.
    pub const LOGS_ONLY: Self = Self {
        metrics: false,
        logs: true,
    };
}

/// A telemetry destination, invoked at each flush boundary.
///
/// A sink's own method returning an error does not abort the flush for
/// other sinks; the router isolates failures per sink, matching
/// `core/collector.py`'s per-output `try/except` around each call.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Stable name used in configuration and logs.
    fn name(&self) -> &str;

    /// What this sink accepts.
    fn capability(&self) -> Capability;

    /// Write a batch of metrics. Only called when `capability().metrics`.
    ///
    /// # Errors
    /// Any error fails this sink's contribution to the current flush but
    /// does not abort other sinks.
    async fn write_metrics(&self, _metrics: &[Metric]) -> anyhow::Result<()> {
        Ok(())
    }

    /// Write a batch of logs. Only called when `capability().logs`.
    ///
    /// # Errors
    /// Any error fails this sink's contribution to the current flush but
    /// does not abort other sinks.
    async fn write_logs(&self, _logs: &[LogRecord]) -> anyhow::Result<()> {
        Ok(())
    }
}
