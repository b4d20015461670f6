//! Metric/log buffering between collection and flush.
//!
//! Ports `core/collector.py`'s `self.metric_buffer`/`self.log_buffer` lists:
//! items accumulate across cycles and are only trimmed at a flush boundary,
//! never at append time, so a collector that overproduces mid-cycle doesn't
//! pay a drop-oldest cost on every single append.

use std::collections::VecDeque;

use rtcollector_core::{LogRecord, Metric};

/// How many items were silently dropped enforcing capacity, reported so the
/// caller can log a warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overflow {
    /// Metrics dropped from the front of the buffer.
    pub metrics: usize,
    /// Logs dropped from the front of the buffer.
    pub logs: usize,
}

impl Overflow {
    fn is_empty(self) -> bool {
        self.metrics == 0 && self.logs == 0
    }
}

/// The paired metric/log buffer a scheduler cycle appends to and a flush
/// drains.
#[derive(Debug, Default)]
pub struct BufferPair {
    metrics: VecDeque<Metric>,
    logs: VecDeque<LogRecord>,
    max_metrics: usize,
    max_logs: usize,
}

impl BufferPair {
    /// Build a buffer pair with the given per-type capacities.
    #[must_use]
    pub fn new(max_metrics: usize, max_logs: usize) -> Self {
        Self {
            metrics: VecDeque::new(),
            logs: VecDeque::new(),
            max_metrics,
            max_logs,
        }
    }

    /// Append metrics produced this cycle. Capacity is not enforced here.
    pub fn append_metrics(&mut self, items: impl IntoIterator<Item = Metric>) {
        self.metrics.extend(items);
    }

    /// Append logs produced this cycle. Capacity is not enforced here.
    pub fn append_logs(&mut self, items: impl IntoIterator<Item = LogRecord>) {
        self.logs.extend(items);
    }

    /// Current occupancy as `(metrics, logs)`, for gauge-style logging.
    #[must_use]
    pub fn occupancy(&self) -> (usize, usize) {
        (self.metrics.len(), self.logs.len())
    }

    /// Capacities as `(max_metrics, max_logs)`.
    #[must_use]
    pub fn capacity(&self) -> (usize, usize) {
        (self.max_metrics, self.max_logs)
    }

    /// Drop the oldest items over capacity. Called only at the flush
    /// boundary, never on every append.
    pub fn enforce_capacity(&mut self) -> Overflow {
        let mut overflow = Overflow::default();
        while self.metrics.len() > self.max_metrics {
            self.metrics.pop_front();
            overflow.metrics += 1;
        }
        while self.logs.len() > self.max_logs {
            self.logs.pop_front();
            overflow.logs += 1;
        }
        overflow
    }

    /// Borrow the buffered metrics and logs for a flush attempt, without
    /// draining them: a failed flush must retain this content.
    ///
    /// `make_contiguous` forces the ring buffer's internal storage into one
    /// slice first — after enough `pop_front`/`extend` cycles the deque
    /// wraps, and `as_slices().0` alone would silently drop the wrapped
    /// remainder from the flush.
    #[must_use]
    pub fn snapshot(&mut self) -> (&[Metric], &[LogRecord]) {
        (self.metrics.make_contiguous(), self.logs.make_contiguous())
    }

    /// Drain both buffers after a fully successful flush.
    pub fn clear(&mut self) {
        self.metrics.clear();
        self.logs.clear();
    }

    /// Whether both buffers are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.logs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(n: i64) -> Metric {
        Metric::new("m", n as f64, Some(n), std::collections::HashMap::new()).unwrap()
    }

    /// After `enforce_capacity`, occupancy never exceeds the configured
    /// max, and the newest items survive.
    #[test]
    fn overflow_drops_oldest_first() {
        let mut buf = BufferPair::new(3, 10);
        buf.append_metrics((0..5).map(metric));
        let overflow = buf.enforce_capacity();
        assert_eq!(overflow.metrics, 2);
        let (m, _) = buf.snapshot();
        let values: Vec<i64> = m.iter().map(|x| x.timestamp).collect();
        assert_eq!(values, vec![2, 3, 4]);
    }

    #[test]
    fn capacity_is_not_enforced_on_append() {
        let mut buf = BufferPair::new(1, 1);
        buf.append_metrics((0..5).map(metric));
        assert_eq!(buf.occupancy().0, 5);
    }

    #[test]
    fn clear_empties_both_buffers() {
        let mut buf = BufferPair::new(10, 10);
        buf.append_metrics(std::iter::once(metric(1)));
        buf.append_logs(std::iter::once(LogRecord::new("x")));
        buf.clear();
        assert!(buf.is_empty());
    }

    #[test]
    fn overflow_is_empty_when_under_capacity() {
        let overflow = Overflow::default();
        assert!(overflow.is_empty());
    }

    /// After enough pop_front/extend cycles the underlying `VecDeque` wraps
    /// around its allocation and is no longer contiguous; `snapshot` must
    /// still surface every buffered item, not just the first internal slice.
    #[test]
    fn snapshot_includes_items_after_the_deque_wraps() {
        let mut buf = BufferPair::new(4, 10);
        for round in 0..5 {
            buf.append_metrics(std::iter::once(metric(round)));
            buf.enforce_capacity();
        }
        let (m, _) = buf.snapshot();
        assert_eq!(m.len(), 4);
        let values: Vec<i64> = m.iter().map(|x| x.timestamp).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }
}
