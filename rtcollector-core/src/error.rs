//! Error types shared across the rtcollector workspace.

use thiserror::Error;

/// Result type alias using [`AgentError`].
pub type Result<T> = std::result::Result<T, AgentError>;

/// Top-level error type for the telemetry agent.
///
/// Subsystem-specific errors (config parsing, collector invocation, sink
/// writes, secret resolution) convert into this via `#[from]` so call sites
/// can use `?` uniformly while still preserving the originating kind for
/// logging.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A metric or log record failed validation (non-finite value, empty
    /// name, etc.).
    #[error("invalid metric or log record: {0}")]
    Model(#[from] ModelError),

    /// A collector failed to produce data for a cycle.
    #[error("collector '{collector}' failed: {source}")]
    Collector {
        /// Name of the collector that failed.
        collector: String,
        /// Underlying cause.
        #[source]
        source: anyhow::Error,
    },

    /// A sink failed to write a batch.
    #[error("sink '{sink}' failed: {source}")]
    Sink {
        /// Name of the sink that failed.
        sink: String,
        /// Underlying cause.
        #[source]
        source: anyhow::Error,
    },

    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error occurred outside a specific collector/sink (e.g.
    /// reading the config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while constructing or validating canonical data model
/// values ([`crate::model::Metric`], [`crate::model::LogRecord`]).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ModelError {
    /// `name` was empty.
    #[error("metric/log name must not be empty")]
    EmptyName,

    /// `value` was NaN or infinite.
    #[error("metric value must be finite, got {0}")]
    NonFiniteValue(String),
}
