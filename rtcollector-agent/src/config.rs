//! Configuration loading and secret resolution.
//!
//! Ports `core/config.py`'s `yaml.safe_load` loader and `main.py`'s CLI
//! argument parsing. Secrets are resolved against the raw [`serde_yaml::Value`]
//! tree before it is deserialized into [`AgentConfig`], mirroring
//! `secrets/provider.py`'s `process_config` recursive walk over the raw dict.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use rtcollector_core::AgentError;
use serde::Deserialize;

use crate::secrets::{EnvSecretProvider, SecretProvider, VaultSecretProvider};

/// Command-line arguments, mirroring `main.py`'s `argparse` setup.
#[derive(Debug, Parser)]
#[command(name = "rtcollector", about = "Host-resident telemetry agent")]
pub struct Args {
    /// Path to the YAML configuration file.
    #[arg(short = 'c', long = "config", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Enable debug-level logging.
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Run a single collect-and-flush cycle, then exit.
    #[arg(long = "once")]
    pub once: bool,
}

/// One entry under `inputs`, `outputs`, `metrics_only_outputs`, or
/// `logs_only_outputs`: a plugin name plus its free-form options.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginSpec {
    /// Registered collector or sink name (e.g. `linux_cpu`, `http_response`).
    pub name: String,
    /// Plugin-specific options, passed through untouched.
    #[serde(default)]
    pub options: serde_yaml::Value,
}

/// The `secret_store` section: which [`SecretProvider`] to resolve
/// `secret:`-prefixed values against.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecretStoreConfig {
    /// `"env"` (default) or `"vault"`.
    #[serde(default)]
    pub provider: Option<String>,
    /// Prefix for the env provider, or the Vault base path for the vault
    /// provider.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Vault server address, required when `provider = "vault"`.
    #[serde(default)]
    pub vault_addr: Option<String>,
    /// Vault token, required when `provider = "vault"`.
    #[serde(default)]
    pub vault_token: Option<String>,
}

/// Top-level agent configuration, deserialized from `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Seconds between collection cycles.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Seconds between flush attempts; defaults to `interval` when absent.
    #[serde(default)]
    pub flush_interval: Option<u64>,

    /// Buffer capacity applied to both metrics and logs unless overridden.
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,

    /// Whether to log a warning when drop-oldest engages at a flush
    /// boundary.
    #[serde(default = "default_warn_on_buffer")]
    pub warn_on_buffer: bool,

    /// Overrides `max_buffer_size` for the metrics buffer only.
    #[serde(default)]
    pub max_buffer_metrics: Option<usize>,

    /// Overrides `max_buffer_size` for the logs buffer only.
    #[serde(default)]
    pub max_buffer_logs: Option<usize>,

    /// Global tags applied to every emitted metric and log, winning over
    /// any collector-set label of the same name.
    #[serde(default)]
    pub tags: HashMap<String, String>,

    /// Collectors to run each cycle.
    #[serde(default)]
    pub inputs: Vec<PluginSpec>,

    /// Sinks that accept both metrics and logs.
    #[serde(default)]
    pub outputs: Vec<PluginSpec>,

    /// Sinks that accept metrics only.
    #[serde(default)]
    pub metrics_only_outputs: Vec<PluginSpec>,

    /// Sinks that accept logs only.
    #[serde(default)]
    pub logs_only_outputs: Vec<PluginSpec>,

    /// Secret resolution configuration.
    #[serde(default)]
    pub secret_store: SecretStoreConfig,
}

fn default_interval() -> u64 {
    15
}

fn default_max_buffer_size() -> usize {
    1000
}

fn default_warn_on_buffer() -> bool {
    true
}

impl AgentConfig {
    /// Seconds between flush attempts, defaulting to `interval` when the
    /// config leaves `flush_interval` unset. A configured value below
    /// `interval` is clamped up to `interval`, with a one-time startup
    /// warning, rather than allowed to starve every other cycle's flush
    /// gate.
    #[must_use]
    pub fn effective_flush_interval(&self) -> u64 {
        match self.flush_interval {
            Some(configured) if configured < self.interval => {
                tracing::warn!(
                    configured,
                    interval = self.interval,
                    "flush_interval is below interval, clamping to interval"
                );
                self.interval
            }
            Some(configured) => configured,
            None => self.interval,
        }
    }

    /// Metrics buffer capacity, honoring the per-type override.
    #[must_use]
    pub fn effective_max_buffer_metrics(&self) -> usize {
        self.max_buffer_metrics.unwrap_or(self.max_buffer_size)
    }

    /// Logs buffer capacity, honoring the per-type override.
    #[must_use]
    pub fn effective_max_buffer_logs(&self) -> usize {
        self.max_buffer_logs.unwrap_or(self.max_buffer_size)
    }
}

/// Load, resolve secrets in, and parse a YAML configuration file.
///
/// # Errors
/// Returns [`AgentError::Io`] if the file cannot be read, or
/// [`AgentError::Config`] if it is not valid YAML or does not match
/// [`AgentConfig`]'s shape.
pub async fn load(path: &Path) -> Result<AgentConfig, AgentError> {
    let raw = std::fs::read_to_string(path)?;
    let mut value: serde_yaml::Value =
        serde_yaml::from_str(&raw).map_err(|e| AgentError::Config(e.to_string()))?;

    let store_cfg: SecretStoreConfig = value
        .get("secret_store")
        .cloned()
        .map(serde_yaml::from_value)
        .transpose()
        .map_err(|e| AgentError::Config(e.to_string()))?
        .unwrap_or_default();
    let provider = build_provider(&store_cfg);
    let unresolved = crate::secrets::resolve_in_place(&mut value, provider.as_ref()).await;
    for id in &unresolved {
        tracing::warn!(secret = %id, "secret placeholder could not be resolved, left as-is");
    }

    serde_yaml::from_value(value).map_err(|e| AgentError::Config(e.to_string()))
}

fn build_provider(cfg: &SecretStoreConfig) -> Box<dyn SecretProvider> {
    match cfg.provider.as_deref() {
        Some("vault") => Box::new(VaultSecretProvider::new(
            cfg.vault_addr.clone().unwrap_or_default(),
            cfg.vault_token.clone().unwrap_or_default(),
            cfg.prefix.clone().unwrap_or_else(|| "secret/data".to_string()),
        )),
        _ => Box::new(EnvSecretProvider::new(
            cfg.prefix.clone().unwrap_or_else(|| "SECRET".to_string()),
        )),
    }
}
