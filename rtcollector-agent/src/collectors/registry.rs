//! Collector registry and per-cycle invocation adapter.
//!
//! Ports two things from `main.py`/`core/collector.py`:
//!
//! - `main.py`'s OS-based plugin name aliasing: on Darwin, a configured
//!   `linux_*` input is substituted for `macos_*` when the latter is
//!   registered, rather than failing to find a `linux_cpu` module that was
//!   never shipped for macOS. `main.py` also dynamically imported plugins by
//!   name; this crate uses a static name→factory table built at startup
//!   instead of runtime module loading.
//! - `core/collector.py`'s per-collector timing and exception isolation
//!   inside the cycle loop: each call is timed, a call over one second logs
//!   a warning instead of info, and an error is caught and turned into a
//!   diagnostic log line rather than aborting the cycle.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rtcollector_core::{LogLevel, LogRecord};

use super::{Batch, Collector};

const SLOW_COLLECTOR_THRESHOLD: Duration = Duration::from_secs(1);

/// A named, constructed collector held by the registry.
struct Entry {
    name: String,
    collector: Box<dyn Collector>,
}

/// Holds every collector configured for this run, in registration order.
#[derive(Default)]
pub struct CollectorRegistry {
    entries: Vec<Entry>,
}

impl CollectorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector under `name`.
    pub fn register(&mut self, name: impl Into<String>, collector: Box<dyn Collector>) {
        self.entries.push(Entry {
            name: name.into(),
            collector,
        });
    }

    /// Whether a collector is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Call `start` on every registered collector, in registration order.
    ///
    /// # Errors
    /// Returns the first error a collector's `start` produces.
    pub async fn start_all(&mut self) -> anyhow::Result<()> {
        for entry in &mut self.entries {
            entry.collector.start().await?;
        }
        Ok(())
    }

    /// Call `stop` on every registered collector, in registration order,
    /// collecting rather than short-circuiting on the first error.
    pub async fn stop_all(&mut self) {
        for entry in &mut self.entries {
            if let Err(err) = entry.collector.stop().await {
                tracing::warn!(collector = %entry.name, error = %err, "collector failed to stop cleanly");
            }
        }
    }

    /// Invoke every collector once, in registration order, merging their
    /// output into one batch plus the diagnostic log lines the adapter
    /// itself produced (slow-collector warnings, caught errors).
    pub async fn collect_cycle(&mut self) -> (Batch, Vec<LogRecord>) {
        let mut batch = Batch::empty();
        let mut diagnostics = Vec::new();

        for entry in &mut self.entries {
            let (item, mut diag) = invoke_one(&entry.name, entry.collector.as_mut()).await;
            batch.metrics.extend(item.metrics);
            batch.logs.extend(item.logs);
            diagnostics.append(&mut diag);
        }

        (batch, diagnostics)
    }
}

async fn invoke_one(name: &str, collector: &mut dyn Collector) -> (Batch, Vec<LogRecord>) {
    let start = Instant::now();
    let result = collector.collect().await;
    let elapsed = start.elapsed();

    match result {
        Ok(batch) => {
            if elapsed > SLOW_COLLECTOR_THRESHOLD {
                tracing::warn!(collector = name, elapsed_ms = elapsed.as_millis() as u64, "slow collector cycle");
                let diag = vec![LogRecord::at(
                    LogLevel::Warn,
                    format!("collector '{name}' took {}ms", elapsed.as_millis()),
                )
                .with_tag("collector", name)];
                (batch, diag)
            } else {
                tracing::info!(collector = name, elapsed_ms = elapsed.as_millis() as u64, "collector cycle");
                (batch, Vec::new())
            }
        }
        Err(err) => {
            tracing::error!(collector = name, error = %err, "collector cycle failed");
            let diag = vec![LogRecord::at(
                LogLevel::Error,
                format!("collector '{name}' failed: {err}"),
            )
            .with_tag("collector", name)];
            (Batch::empty(), diag)
        }
    }
}

/// Resolve a configured collector name against the registered set, applying
/// the Darwin `linux_*` → `macos_*` aliasing rule when the literal name is
/// not registered but its macOS counterpart is.
#[must_use]
pub fn resolve_platform_alias(configured_name: &str, registered: &HashMap<String, ()>) -> String {
    if registered.contains_key(configured_name) {
        return configured_name.to_string();
    }
    if let Some(suffix) = configured_name.strip_prefix("linux_") {
        let alias = format!("macos_{suffix}");
        if registered.contains_key(&alias) && cfg!(target_os = "macos") {
            return alias;
        }
    }
    configured_name.to_string()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Echo {
        name: String,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Collector for Echo {
        fn name(&self) -> &str {
            &self.name
        }

        async fn collect(&mut self) -> anyhow::Result<Batch> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Batch::from_metrics(vec![rtcollector_core::Metric::unlabeled(
                "x", 1.0,
            )
            .unwrap()]))
        }
    }

    struct Failing;
    #[async_trait]
    impl Collector for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        async fn collect(&mut self) -> anyhow::Result<Batch> {
            anyhow::bail!("nope")
        }
    }

    #[tokio::test]
    async fn collect_cycle_merges_metrics_across_collectors() {
        let mut registry = CollectorRegistry::new();
        registry.register(
            "a",
            Box::new(Echo {
                name: "a".to_string(),
                calls: std::sync::atomic::AtomicUsize::new(0),
            }),
        );
        registry.register(
            "b",
            Box::new(Echo {
                name: "b".to_string(),
                calls: std::sync::atomic::AtomicUsize::new(0),
            }),
        );
        let (batch, diagnostics) = registry.collect_cycle().await;
        assert_eq!(batch.metrics.len(), 2);
        assert!(diagnostics.is_empty());
    }

    /// A failing collector is isolated: its error becomes a diagnostic log,
    /// and the cycle still reports the other collectors' output.
    #[tokio::test]
    async fn failing_collector_is_isolated() {
        let mut registry = CollectorRegistry::new();
        registry.register("failing", Box::new(Failing));
        registry.register(
            "ok",
            Box::new(Echo {
                name: "ok".to_string(),
                calls: std::sync::atomic::AtomicUsize::new(0),
            }),
        );
        let (batch, diagnostics) = registry.collect_cycle().await;
        assert_eq!(batch.metrics.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, LogLevel::Error);
    }

    #[test]
    fn linux_alias_resolves_to_macos_when_present_and_on_macos() {
        let mut registered = HashMap::new();
        registered.insert("macos_cpu".to_string(), ());
        let resolved = resolve_platform_alias("linux_cpu", &registered);
        if cfg!(target_os = "macos") {
            assert_eq!(resolved, "macos_cpu");
        } else {
            assert_eq!(resolved, "linux_cpu");
        }
    }

    #[test]
    fn exact_match_is_used_without_aliasing() {
        let mut registered = HashMap::new();
        registered.insert("linux_cpu".to_string(), ());
        assert_eq!(resolve_platform_alias("linux_cpu", &registered), "linux_cpu");
    }
}
