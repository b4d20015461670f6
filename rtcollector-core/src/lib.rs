#![warn(missing_docs)]

//! Canonical data model and pure-logic building blocks for the rtcollector
//! telemetry agent.
//!
//! This crate has no async runtime or I/O dependency: it holds the pieces of
//! the collection-and-flush engine ([`model`], [`rate`], [`tags`]) that are
//! plain data and arithmetic, so they can be unit tested without tokio and
//! reused by collectors/sinks that live in `rtcollector-agent`.

pub mod error;
pub mod model;
pub mod rate;
pub mod tags;

pub use error::{AgentError, ModelError, Result};
pub use model::{LogLevel, LogRecord, Metric};
pub use rate::{compose_key, RateHelper};
pub use tags::TagInjector;
