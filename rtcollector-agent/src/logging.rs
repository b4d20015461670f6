//! Process-wide logging setup.
//!
//! Ports `main.py`'s `logging.basicConfig(level=DEBUG if args.debug else INFO)`
//! onto `tracing-subscriber`'s env-filter builder: `--debug` raises the
//! default level, and `RUST_LOG` still overrides it for anyone who sets it.

/// Install the global `tracing` subscriber. `debug` raises the default
/// filter from `info` to `debug`; `RUST_LOG`, if set, takes precedence.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
