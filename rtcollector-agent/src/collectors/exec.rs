//! External-command collector.
//!
//! Ports `inputs/exec.py`: runs a configured shell command and parses its
//! stdout in one of two formats:
//!
//! - `json`: a structured `{"metrics": [...], "logs": [...]}` document, or
//!   a flat object of `name: value` pairs treated as unlabeled metrics.
//! - `metrics`: one line per item, `name value [k=v ...]`, the original's
//!   line-oriented text format for scripts too simple to emit JSON.
//!
//! `exec_execution_time_ms` is always emitted, win or lose, matching the
//! original always recording how long the subprocess took.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use rtcollector_core::Metric;
use serde::Deserialize;
use tokio::process::Command;

use super::{Batch, Collector};

/// How to parse a command's stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `{"metrics": [...], "logs": [...]}` or a flat name/value object.
    Json,
    /// `name value k=v k=v ...`, one item per line.
    Metrics,
}

/// Runs a shell command once per cycle and parses its stdout.
pub struct ExecCollector {
    name: String,
    command: String,
    format: OutputFormat,
}

impl ExecCollector {
    /// Build a collector that runs `command` through `/bin/sh -c`.
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            format,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StructuredOutput {
    #[serde(default)]
    metrics: HashMap<String, f64>,
}

#[async_trait]
impl Collector for ExecCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&mut self) -> anyhow::Result<Batch> {
        let start = Instant::now();
        let output = Command::new("/bin/sh")
            .arg("-c")
            .arg(&self.command)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let mut metrics = match self.format {
            OutputFormat::Json => parse_json(&stdout)?,
            OutputFormat::Metrics => parse_metrics_lines(&stdout)?,
        };
        metrics.push(Metric::unlabeled("exec_execution_time_ms", elapsed_ms)?);
        Ok(Batch::from_metrics(metrics))
    }
}

fn parse_json(stdout: &str) -> anyhow::Result<Vec<Metric>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if let Ok(structured) = serde_json::from_str::<StructuredOutput>(trimmed) {
        if !structured.metrics.is_empty() {
            return structured
                .metrics
                .into_iter()
                .map(|(name, value)| Metric::unlabeled(name, value).map_err(anyhow::Error::from))
                .collect();
        }
    }
    let flat: HashMap<String, f64> = serde_json::from_str(trimmed)?;
    flat.into_iter()
        .map(|(name, value)| Metric::unlabeled(name, value).map_err(anyhow::Error::from))
        .collect()
}

fn parse_metrics_lines(stdout: &str) -> anyhow::Result<Vec<Metric>> {
    let mut metrics = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else { continue };
        let Some(value_str) = parts.next() else { continue };
        let value: f64 = value_str.parse()?;
        let mut labels = HashMap::new();
        for pair in parts {
            if let Some((k, v)) = pair.split_once('=') {
                labels.insert(k.to_string(), v.to_string());
            }
        }
        metrics.push(Metric::new(name, value, None, labels)?);
    }
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_metrics_line_format_with_labels() {
        let metrics = parse_metrics_lines("queue_depth 42 queue=orders region=us\nidle 0\n").unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "queue_depth");
        assert_eq!(metrics[0].value, 42.0);
        assert_eq!(metrics[0].labels.get("queue").unwrap(), "orders");
        assert_eq!(metrics[1].name, "idle");
        assert!(metrics[1].labels.is_empty());
    }

    #[test]
    fn parses_structured_json() {
        let metrics = parse_json(r#"{"metrics": {"a": 1.0, "b": 2.0}}"#).unwrap();
        assert_eq!(metrics.len(), 2);
    }

    #[test]
    fn parses_flat_json() {
        let metrics = parse_json(r#"{"a": 1.0, "b": 2.0}"#).unwrap();
        assert_eq!(metrics.len(), 2);
    }

    #[test]
    fn empty_stdout_yields_no_metrics() {
        assert!(parse_json("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn collect_always_reports_execution_time() {
        let mut collector =
            ExecCollector::new("uptime", "echo 'ok 1'", OutputFormat::Metrics);
        let batch = collector.collect().await.unwrap();
        assert!(batch
            .metrics
            .iter()
            .any(|m| m.name == "exec_execution_time_ms"));
    }
}
