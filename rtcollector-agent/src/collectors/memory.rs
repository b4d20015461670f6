//! System memory usage collector.
//!
//! Supplements the original Python agent's Linux/macOS CPU-only input set
//! (per `original_source/_INDEX.md`, the shipped plugins covered only CPU,
//! HTTP, exec, and syslog) with a `sysinfo`-backed memory collector, adapted
//! to this crate's one-collector-per-cycle shape instead of a dedicated
//! interval-loop thread.

use async_trait::async_trait;
use rtcollector_core::Metric;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use super::{Batch, Collector};

/// Collects total/used/available memory and swap via `sysinfo`.
pub struct MemoryCollector {
    system: System,
}

impl MemoryCollector {
    /// Build a memory collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: System::new_with_specifics(
                RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
            ),
        }
    }
}

impl Default for MemoryCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collector for MemoryCollector {
    fn name(&self) -> &str {
        "memory"
    }

    async fn collect(&mut self) -> anyhow::Result<Batch> {
        self.system.refresh_memory();
        let total = self.system.total_memory() as f64;
        let used = self.system.used_memory() as f64;
        let available = self.system.available_memory() as f64;
        let percent = if total > 0.0 { used / total * 100.0 } else { 0.0 };

        let metrics = vec![
            Metric::unlabeled("memory_total_bytes", total)?,
            Metric::unlabeled("memory_used_bytes", used)?,
            Metric::unlabeled("memory_available_bytes", available)?,
            Metric::unlabeled("memory_used_percent", percent)?,
            Metric::unlabeled("memory_swap_total_bytes", self.system.total_swap() as f64)?,
            Metric::unlabeled("memory_swap_used_bytes", self.system.used_swap() as f64)?,
        ];
        Ok(Batch::from_metrics(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_memory_metrics() {
        let mut collector = MemoryCollector::new();
        let batch = collector.collect().await.unwrap();
        assert_eq!(batch.metrics.len(), 6);
    }
}
