//! Global tag injection.
//!
//! Ports `collector.py`'s `item.labels.update(self.tags)` call site into an
//! explicit, testable step applied once per emitted [`Metric`]/[`LogRecord`]:
//! global tags always win on key collision, resolving the source's
//! ambiguous merge direction (some call sites there did the opposite).

use std::collections::HashMap;

use crate::model::{LogRecord, Metric};

/// Holds the operator-configured global label set and applies it to
/// outgoing metrics and log records.
#[derive(Debug, Clone, Default)]
pub struct TagInjector {
    global_tags: HashMap<String, String>,
}

impl TagInjector {
    /// Build an injector from the `tags` section of the configuration.
    #[must_use]
    pub fn new(global_tags: HashMap<String, String>) -> Self {
        Self { global_tags }
    }

    /// Merge the global tags into a metric's labels, global tags winning on
    /// collision.
    pub fn inject_metric(&self, metric: &mut Metric) {
        merge_global_wins(&mut metric.labels, &self.global_tags);
    }

    /// Merge the global tags into a log record's tags, global tags winning
    /// on collision.
    pub fn inject_log(&self, log: &mut LogRecord) {
        merge_global_wins(&mut log.tags, &self.global_tags);
    }
}

fn merge_global_wins(target: &mut HashMap<String, String>, global: &HashMap<String, String>) {
    for (k, v) in global {
        target.insert(k.clone(), v.clone());
    }
}
