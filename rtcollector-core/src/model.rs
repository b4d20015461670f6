//! Canonical metric and log-record types.
//!
//! Mirrors `core/metric.py` in the original collector (a bare `name`,
//! `value`, `timestamp`, `labels` dataclass) but adds the validation the
//! Python version left to callers, plus a structured [`LogRecord`] type for
//! the log half of the stream.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A single point-in-time measurement.
///
/// Immutable after construction: there is no setter for `value` or
/// `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name (`[A-Za-z_][A-Za-z0-9_]*` recommended, not enforced).
    pub name: String,
    /// Metric value. Always finite.
    pub value: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Dimensional labels.
    pub labels: HashMap<String, String>,
}

impl Metric {
    /// Construct a metric, defaulting `timestamp` to now and rejecting
    /// empty names or non-finite values.
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyName`] if `name` is empty, or
    /// [`ModelError::NonFiniteValue`] if `value` is NaN or infinite.
    pub fn new(
        name: impl Into<String>,
        value: f64,
        timestamp: Option<i64>,
        labels: HashMap<String, String>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }
        if !value.is_finite() {
            return Err(ModelError::NonFiniteValue(value.to_string()));
        }
        Ok(Self {
            name,
            value,
            timestamp: timestamp.unwrap_or_else(now_millis),
            labels,
        })
    }

    /// Construct a metric with no labels.
    ///
    /// # Errors
    /// See [`Metric::new`].
    pub fn unlabeled(name: impl Into<String>, value: f64) -> Result<Self, ModelError> {
        Self::new(name, value, None, HashMap::new())
    }

    /// Insert or overwrite a label, returning `self` for chaining.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Severity of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Fine-grained diagnostic detail.
    Debug,
    /// Normal operational message.
    Info,
    /// Recoverable but noteworthy condition.
    Warn,
    /// Failure requiring attention.
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// A structured log entry produced by a collector or emitted by the engine
/// itself (slow-collector warnings, overflow warnings, sink failures, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Human-readable message.
    pub message: String,
    /// Severity, defaults to [`LogLevel::Info`].
    #[serde(default)]
    pub level: LogLevel,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Dimensional tags (same merge semantics as [`Metric::labels`]).
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Free-form structured payload (collector-specific fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl LogRecord {
    /// Construct a log record at the default level with no tags.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: LogLevel::default(),
            timestamp: now_millis(),
            tags: HashMap::new(),
            extra: None,
        }
    }

    /// Construct a log record at the given level.
    pub fn at(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            ..Self::new(message)
        }
    }

    /// Attach a tag, returning `self` for chaining.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Milliseconds since the Unix epoch, for default timestamps.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        assert_eq!(
            Metric::unlabeled("", 1.0).unwrap_err(),
            ModelError::EmptyName
        );
    }

    #[test]
    fn rejects_non_finite_value() {
        assert!(Metric::unlabeled("x", f64::NAN).is_err());
        assert!(Metric::unlabeled("x", f64::INFINITY).is_err());
        assert!(Metric::unlabeled("x", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn defaults_timestamp_to_now() {
        let before = now_millis();
        let m = Metric::unlabeled("x", 1.0).unwrap();
        assert!(m.timestamp >= before);
    }

    #[test]
    fn log_record_defaults_to_info() {
        let log = LogRecord::new("hello");
        assert_eq!(log.level, LogLevel::Info);
        assert!(log.tags.is_empty());
    }
}
