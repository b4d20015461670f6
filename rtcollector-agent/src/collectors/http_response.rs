//! HTTP endpoint probe collector.
//!
//! Ports `inputs/http_response.py`: fetches a URL, measures response time,
//! status code, and content length, and optionally checks the body for a
//! substring and the status against an expected value, logging a warning
//! when either check fails. The original also inspected the TLS
//! certificate's expiry via `ssl`/`OpenSSL`; no certificate-introspection
//! crate is in the adopted dependency stack, so that sub-check is dropped
//! here (noted in the accompanying design notes) — connection failures
//! (including TLS handshake failures) are still reported as a collector
//! error via the adapter's normal error path.

use std::time::Instant;

use async_trait::async_trait;
use rtcollector_core::{LogLevel, LogRecord, Metric};

use super::{Batch, Collector};

/// Probes one HTTP(S) URL per cycle.
pub struct HttpResponseCollector {
    name: String,
    url: String,
    expected_status: Option<u16>,
    expected_substring: Option<String>,
    client: reqwest::Client,
}

impl HttpResponseCollector {
    /// Build a probe for `url`, identified in metrics/logs as `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            expected_status: None,
            expected_substring: None,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Require the response status to equal `status`.
    #[must_use]
    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// Require the response body to contain `substring`.
    #[must_use]
    pub fn expect_substring(mut self, substring: impl Into<String>) -> Self {
        self.expected_substring = Some(substring.into());
        self
    }
}

#[async_trait]
impl Collector for HttpResponseCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&mut self) -> anyhow::Result<Batch> {
        let start = Instant::now();
        let response = self.client.get(&self.url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut metrics = vec![
            Metric::unlabeled("http_response_time_ms", elapsed_ms)?
                .with_label("target", self.name.clone()),
            Metric::unlabeled("http_response_status_code", f64::from(status))?
                .with_label("target", self.name.clone()),
            Metric::unlabeled("http_response_content_length", body.len() as f64)?
                .with_label("target", self.name.clone()),
        ];

        let mut logs = Vec::new();
        if let Some(expected) = self.expected_status {
            if status != expected {
                logs.push(
                    LogRecord::at(
                        LogLevel::Warn,
                        format!(
                            "http probe '{}' expected status {expected} but got {status}",
                            self.name
                        ),
                    )
                    .with_tag("target", self.name.clone()),
                );
            }
        }
        if let Some(substring) = &self.expected_substring {
            if !body.contains(substring.as_str()) {
                logs.push(
                    LogRecord::at(
                        LogLevel::Warn,
                        format!("http probe '{}' response body did not contain expected text", self.name),
                    )
                    .with_tag("target", self.name.clone()),
                );
            }
        }

        metrics.push(
            Metric::unlabeled("http_response_match_ok", if logs.is_empty() { 1.0 } else { 0.0 })?
                .with_label("target", self.name.clone()),
        );

        Ok(Batch { metrics, logs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_expectations() {
        let collector = HttpResponseCollector::new("api", "http://localhost/health")
            .expect_status(200)
            .expect_substring("ok");
        assert_eq!(collector.expected_status, Some(200));
        assert_eq!(collector.expected_substring.as_deref(), Some("ok"));
    }
}
