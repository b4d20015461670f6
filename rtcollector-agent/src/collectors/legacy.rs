//! Normalizes the three historical collector return shapes into a [`Batch`].
//!
//! `core/collector.py` accepted whatever its plugins handed back and
//! branched on its shape at the call site. The shapes, as observed across
//! the original `inputs/*.py` plugins:
//!
//! 1. A named dict: `{"<prefix>_metrics": [...], "<prefix>_logs": [...]}`
//!    (`inputs/http_response.py`, `inputs/syslog.py`).
//! 2. A plain `(metrics, logs)` pair.
//! 3. A flat, mixed sequence of metric-like and log-like items, classified
//!    item by item (`inputs/exec.py`'s `metrics` text format, which yields
//!    one line per item with no separate log/metric grouping).
//!
//! Every collector in this crate builds a [`Batch`] directly and has no use
//! for this module at runtime; it exists so a collector adapted from a
//! configuration-driven or externally-described source (future plugins) has
//! one normalization path instead of three ad hoc ones, and so the
//! equivalence between the shapes is exercised by a test instead of assumed.

use rtcollector_core::{LogRecord, Metric};

use super::Batch;

/// One item in a flat, mixed collector output (shape 3).
#[derive(Debug, Clone)]
pub enum FlatItem {
    /// A metric-shaped item.
    Metric(Metric),
    /// A log-shaped item.
    Log(LogRecord),
}

/// A collector output in one of the three historical shapes.
#[derive(Debug, Clone)]
pub enum RawOutput {
    /// Shape 1: separate named metric/log lists.
    Named {
        /// Metrics list.
        metrics: Vec<Metric>,
        /// Logs list.
        logs: Vec<LogRecord>,
    },
    /// Shape 2: a plain tuple.
    Tuple(Vec<Metric>, Vec<LogRecord>),
    /// Shape 3: a flat sequence of mixed items.
    Flat(Vec<FlatItem>),
}

/// Fold any of the three legacy shapes into a canonical [`Batch`].
#[must_use]
pub fn normalize(raw: RawOutput) -> Batch {
    match raw {
        RawOutput::Named { metrics, logs } | RawOutput::Tuple(metrics, logs) => {
            Batch { metrics, logs }
        }
        RawOutput::Flat(items) => {
            let mut batch = Batch::empty();
            for item in items {
                match item {
                    FlatItem::Metric(m) => batch.metrics.push(m),
                    FlatItem::Log(l) => batch.logs.push(l),
                }
            }
            batch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The three shapes normalize to the same `Batch` content given the
    /// same underlying items.
    #[test]
    fn all_three_shapes_normalize_equivalently() {
        let metric = Metric::unlabeled("m", 1.0).unwrap();
        let log = LogRecord::new("hi");

        let from_named = normalize(RawOutput::Named {
            metrics: vec![metric.clone()],
            logs: vec![log.clone()],
        });
        let from_tuple = normalize(RawOutput::Tuple(vec![metric.clone()], vec![log.clone()]));
        let from_flat = normalize(RawOutput::Flat(vec![
            FlatItem::Metric(metric.clone()),
            FlatItem::Log(log.clone()),
        ]));

        assert_eq!(from_named.metrics, from_tuple.metrics);
        assert_eq!(from_named.metrics, from_flat.metrics);
        assert_eq!(from_named.logs, from_tuple.logs);
        assert_eq!(from_named.logs, from_flat.logs);
    }
}
