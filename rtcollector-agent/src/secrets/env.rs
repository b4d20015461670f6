//! Environment-variable secret provider.
//!
//! Ports `secrets/env_provider.py`'s `EnvSecretProvider`: an id like
//! `db/password` resolves to the env var `{PREFIX}_DB_PASSWORD`, with `/`
//! and `-` folded to `_` and the whole name upper-cased.

use async_trait::async_trait;

use super::SecretProvider;

/// Resolves secrets from process environment variables.
#[derive(Debug, Clone)]
pub struct EnvSecretProvider {
    prefix: String,
}

impl EnvSecretProvider {
    /// Build a provider that looks up `{prefix}_{id}` (normalized).
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn env_var_name(&self, id: &str) -> String {
        let normalized = id.replace(['/', '-'], "_").to_uppercase();
        format!("{}_{normalized}", self.prefix.to_uppercase())
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, id: &str) -> Option<String> {
        std::env::var(self.env_var_name(id)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_id_into_env_var_name() {
        let provider = EnvSecretProvider::new("rtcollector");
        assert_eq!(
            provider.env_var_name("db/password"),
            "RTCOLLECTOR_DB_PASSWORD"
        );
        assert_eq!(
            provider.env_var_name("api-key"),
            "RTCOLLECTOR_API_KEY"
        );
    }

    #[tokio::test]
    async fn missing_var_resolves_to_none() {
        let provider = EnvSecretProvider::new("rtcollector_test_unlikely_prefix");
        assert_eq!(provider.get_secret("nope").await, None);
    }
}
