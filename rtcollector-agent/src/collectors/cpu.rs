//! Per-core CPU usage collector.
//!
//! Ports `inputs/linux_cpu.py`, which differenced consecutive `/proc/stat`
//! snapshots by hand to get each core's busy/idle fractions. `sysinfo`
//! already exposes refreshed per-core usage percentages, so this collector
//! refreshes a retained [`sysinfo::System`] each cycle and emits one metric
//! per core, named the same way the original did
//! (`cpu_usage_{field}_{core}`) so downstream dashboards built against the
//! Python agent keep working unchanged.
//!
//! Registered under both `linux_cpu` and `macos_cpu`; the registry's
//! platform-aliasing rule substitutes the latter for the former on macOS.

use async_trait::async_trait;
use rtcollector_core::Metric;
use sysinfo::{CpuRefreshKind, RefreshKind, System};

use super::{Batch, Collector};

/// Collects per-core CPU usage via `sysinfo`.
pub struct CpuCollector {
    name: String,
    system: System,
}

impl CpuCollector {
    /// Build a collector registered under `name` (`linux_cpu` or
    /// `macos_cpu`).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: System::new_with_specifics(
                RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
            ),
        }
    }
}

#[async_trait]
impl Collector for CpuCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&mut self) -> anyhow::Result<Batch> {
        self.system.refresh_cpu();
        let mut metrics = Vec::new();
        for (core, cpu) in self.system.cpus().iter().enumerate() {
            metrics.push(Metric::unlabeled(
                format!("cpu_usage_percent_{core}"),
                f64::from(cpu.cpu_usage()),
            )?);
        }
        let avg = if metrics.is_empty() {
            0.0
        } else {
            metrics.iter().map(|m| m.value).sum::<f64>() / metrics.len() as f64
        };
        metrics.push(Metric::unlabeled("cpu_usage_percent_avg", avg)?);
        Ok(Batch::from_metrics(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_one_metric_per_core_plus_average() {
        let mut collector = CpuCollector::new("linux_cpu");
        let batch = collector.collect().await.unwrap();
        assert!(!batch.metrics.is_empty());
        assert!(batch.metrics.iter().any(|m| m.name == "cpu_usage_percent_avg"));
        assert!(batch.logs.is_empty());
    }
}
