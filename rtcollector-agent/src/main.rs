//! Entry point: parses CLI arguments, loads configuration, builds the
//! collector/sink registries, and runs the scheduler.
//!
//! Ports `main.py`'s top-level flow: argument parsing, OS-based plugin
//! aliasing, and the daemon-vs-one-shot branch. The daemon loop selects on
//! both SIGINT and SIGTERM so a container orchestrator's graceful-shutdown
//! signal (SIGTERM) releases collector resources the same way Ctrl-C does.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rtcollector_agent::buffer::BufferPair;
use rtcollector_agent::collectors::registry::{resolve_platform_alias, CollectorRegistry};
use rtcollector_agent::collectors::{cpu, disk, exec, http_response, memory, network, syslog};
use rtcollector_agent::config::{self, Args, PluginSpec};
use rtcollector_agent::sinks::{http_search, http_timeseries, stdout, Sink};
use rtcollector_agent::{AgentConfig, Engine, SinkRouter};
use rtcollector_core::TagInjector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    rtcollector_agent::logging::init(args.debug);

    let config = config::load(&args.config)
        .await
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    let mut engine = build_engine(&config)?;
    engine.start().await.context("starting collectors")?;

    let exit_code = if args.once {
        let outcome = engine.run_once().await;
        engine.shutdown().await;
        tracing::info!(attempted = outcome.attempted, success = outcome.any_success, "one-shot run complete");
        i32::from(outcome.attempted && !outcome.any_success)
    } else {
        run_daemon(&mut engine, config.interval).await;
        0
    };

    std::process::exit(exit_code);
}

async fn run_daemon(engine: &mut Engine, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to register SIGTERM handler");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let outcome = engine.run_cycle().await;
                tracing::debug!(?outcome, "cycle complete");
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                engine.shutdown().await;
                break;
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
                engine.shutdown().await;
                break;
            }
        }
        tracing::debug!(interval_secs, "sleeping until next cycle");
    }
}

fn build_engine(config: &AgentConfig) -> anyhow::Result<Engine> {
    let mut active = CollectorRegistry::new();
    let known = builtin_names();

    for input in &config.inputs {
        let resolved_name = resolve_platform_alias(&input.name, &known);
        match take_builtin(&resolved_name, input) {
            Some(collector) => active.register(resolved_name, collector),
            None => {
                tracing::warn!(name = %input.name, "no collector registered under this name, skipping");
            }
        }
    }

    let outputs = build_sinks(&config.outputs)?;
    let metrics_only = build_sinks(&config.metrics_only_outputs)?;
    let logs_only = build_sinks(&config.logs_only_outputs)?;
    let router = if outputs.is_empty() && metrics_only.is_empty() && logs_only.is_empty() {
        SinkRouter::new(vec![Box::new(stdout::StdoutSink)], vec![], vec![])
    } else {
        SinkRouter::new(outputs, metrics_only, logs_only)
    };

    let buffers = BufferPair::new(
        config.effective_max_buffer_metrics(),
        config.effective_max_buffer_logs(),
    );
    let tag_injector = TagInjector::new(config.tags.clone());
    let flush_interval = Duration::from_secs(config.effective_flush_interval());

    Ok(Engine::with_overflow_warning(
        active,
        router,
        buffers,
        tag_injector,
        flush_interval,
        config.warn_on_buffer,
    ))
}

/// Collector names this build ships, used only to decide whether the
/// platform-aliasing rule applies; the registry actually invoked for a run
/// is built separately in [`build_engine`] from the configured `inputs`.
fn builtin_names() -> HashMap<String, ()> {
    let mut names = HashMap::new();
    for n in ["linux_cpu", "macos_cpu", "memory", "disk", "network", "http_response", "exec", "syslog"] {
        names.insert(n.to_string(), ());
    }
    names
}

fn take_builtin(
    resolved_name: &str,
    spec: &PluginSpec,
) -> Option<Box<dyn rtcollector_agent::collectors::Collector>> {
    match resolved_name {
        "linux_cpu" | "macos_cpu" => Some(Box::new(cpu::CpuCollector::new(resolved_name))),
        "memory" => Some(Box::new(memory::MemoryCollector::new())),
        "disk" => Some(Box::new(disk::DiskCollector::new())),
        "network" => Some(Box::new(network::NetworkCollector::new())),
        "http_response" => {
            let url = spec.options.get("url")?.as_str()?.to_string();
            let mut collector = http_response::HttpResponseCollector::new(spec.name.clone(), url);
            if let Some(status) = spec.options.get("expected_status").and_then(|v| v.as_u64()) {
                collector = collector.expect_status(status as u16);
            }
            if let Some(substring) = spec.options.get("expected_substring").and_then(|v| v.as_str()) {
                collector = collector.expect_substring(substring.to_string());
            }
            Some(Box::new(collector))
        }
        "exec" => {
            let command = spec.options.get("command")?.as_str()?.to_string();
            let format = match spec.options.get("format").and_then(|v| v.as_str()) {
                Some("json") => exec::OutputFormat::Json,
                _ => exec::OutputFormat::Metrics,
            };
            Some(Box::new(exec::ExecCollector::new(spec.name.clone(), command, format)))
        }
        "syslog" => {
            let bind_addr = spec
                .options
                .get("bind_addr")
                .and_then(|v| v.as_str())
                .unwrap_or("0.0.0.0:5514")
                .to_string();
            Some(Box::new(syslog::SyslogCollector::new(bind_addr)))
        }
        _ => None,
    }
}

fn build_sinks(specs: &[PluginSpec]) -> anyhow::Result<Vec<Box<dyn Sink>>> {
    let mut sinks = Vec::new();
    for spec in specs {
        let sink: Box<dyn Sink> = match spec.name.as_str() {
            "stdout" => Box::new(stdout::StdoutSink),
            "http_timeseries" => {
                let url = spec
                    .options
                    .get("url")
                    .and_then(|v| v.as_str())
                    .context("http_timeseries sink requires a url option")?
                    .to_string();
                Box::new(http_timeseries::HttpTimeseriesSink::new(spec.name.clone(), url))
            }
            "http_search" => {
                let url = spec
                    .options
                    .get("url")
                    .and_then(|v| v.as_str())
                    .context("http_search sink requires a url option")?
                    .to_string();
                Box::new(http_search::HttpSearchSink::new(spec.name.clone(), url))
            }
            other => anyhow::bail!("unknown sink '{other}'"),
        };
        sinks.push(sink);
    }
    Ok(sinks)
}
