//! Generic HTTP log-indexing sink.
//!
//! Generalizes `outputs/redissearch.py`'s log indexer: the original wrote
//! each log entry as a hash into a RediSearch index for full-text query. No
//! Redis client crate is in the adopted dependency stack, so this posts the
//! same field set (message, level, timestamp, tags) as a JSON array to any
//! HTTP log-indexing endpoint (an OpenSearch/Elasticsearch-style bulk
//! ingestion URL, or a simple JSON collector) via `reqwest`.

use async_trait::async_trait;
use rtcollector_core::LogRecord;

use super::{Capability, Sink};

/// Posts a JSON array of log records to a configured URL on each flush.
#[derive(Debug, Clone)]
pub struct HttpSearchSink {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpSearchSink {
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
impl Sink for HttpSearchSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> Capability {
        Capability::LOGS_ONLY
    }

    async fn write_logs(&self, logs: &[LogRecord]) -> anyhow::Result<()> {
        if logs.is_empty() {
            return Ok(());
        }
        let resp = self.client.post(&self.url).json(logs).send().await?;
        resp.error_for_status()?;
        Ok(())
    }
}
