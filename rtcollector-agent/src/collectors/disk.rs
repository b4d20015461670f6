//! Per-mount disk usage collector.
//!
//! Supplements the original agent's shipped CPU-only resource input with a
//! `sysinfo`-backed storage collector, using `Disks::new_with_refreshed_list`
//! for per-mount total/available space.

use async_trait::async_trait;
use rtcollector_core::Metric;
use sysinfo::Disks;

use super::{Batch, Collector};

/// Collects total/available bytes per mount point via `sysinfo`.
#[derive(Default)]
pub struct DiskCollector;

impl DiskCollector {
    /// Build a disk collector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Collector for DiskCollector {
    fn name(&self) -> &str {
        "disk"
    }

    async fn collect(&mut self) -> anyhow::Result<Batch> {
        let disks = Disks::new_with_refreshed_list();
        let mut metrics = Vec::new();
        for disk in &disks {
            let mount = disk.mount_point().to_string_lossy().to_string();
            let total = disk.total_space() as f64;
            let available = disk.available_space() as f64;
            let used = total - available;
            let percent = if total > 0.0 { used / total * 100.0 } else { 0.0 };

            metrics.push(
                Metric::unlabeled("disk_total_bytes", total)?.with_label("mount", mount.clone()),
            );
            metrics.push(
                Metric::unlabeled("disk_available_bytes", available)?
                    .with_label("mount", mount.clone()),
            );
            metrics.push(
                Metric::unlabeled("disk_used_percent", percent)?.with_label("mount", mount),
            );
        }
        Ok(Batch::from_metrics(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_three_metrics_per_mount() {
        let mut collector = DiskCollector::new();
        let batch = collector.collect().await.unwrap();
        assert_eq!(batch.metrics.len() % 3, 0);
    }
}
