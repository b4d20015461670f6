#![warn(missing_docs)]

//! Host-resident telemetry agent: a scheduler that runs pluggable
//! collectors on a fixed interval, buffers what they produce, and fans it
//! out to pluggable sinks at a (possibly separate) flush interval.
//!
//! The pure data model, rate-to-counter arithmetic, and global tag
//! injection live in `rtcollector-core`; this crate is the async I/O shell
//! around them — config loading, secret resolution, the collector and sink
//! trait objects and their concrete implementations, buffering, sink
//! fan-out, and the scheduler loop itself.

pub mod buffer;
pub mod collectors;
pub mod config;
pub mod engine;
pub mod logging;
pub mod router;
pub mod secrets;
pub mod sinks;

pub use buffer::BufferPair;
pub use config::AgentConfig;
pub use engine::{CycleOutcome, CyclePhase, Engine, OneShotOutcome};
pub use router::SinkRouter;
