//! Generic HTTP time-series sink.
//!
//! Generalizes `outputs/redistimeseries.py`'s `TS.ADD` writer: the original
//! talked to a Redis instance over its binary protocol via `redistimeseries`;
//! no Redis client crate is in the adopted dependency stack, so this posts
//! the same `(name, timestamp_ms, value, labels)` tuples the original passed
//! to `TS.ADD`, as a JSON array, to any HTTP time-series ingestion endpoint
//! via `reqwest` — the same crate already used for the HTTP probe collector.

use async_trait::async_trait;
use rtcollector_core::Metric;
use serde::Serialize;

use super::{Capability, Sink};

#[derive(Debug, Serialize)]
struct Point<'a> {
    name: &'a str,
    timestamp: i64,
    value: f64,
    labels: &'a std::collections::HashMap<String, String>,
}

/// Posts a JSON array of points to a configured URL on each flush.
#[derive(Debug, Clone)]
pub struct HttpTimeseriesSink {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpTimeseriesSink {
    /// Build a sink posting to `url`, identified in logs/config as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Sink for HttpTimeseriesSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        Capability::METRICS_ONLY
    }

    async fn write_metrics(&self, metrics: &[Metric]) -> anyhow::Result<()> {
        if metrics.is_empty() {
            return Ok(());
        }
        let points: Vec<Point<'_>> = metrics
            .iter()
            .map(|m| Point {
                name: &m.name,
                timestamp: m.timestamp,
                value: m.value,
                labels: &m.labels,
            })
            .collect();
        let resp = self.client.post(&self.url).json(&points).send().await?;
        resp.error_for_status()?;
        Ok(())
    }
}
