//! HashiCorp Vault secret provider.
//!
//! Ports `secrets/vault_provider.py`'s `VaultSecretProvider`, which used the
//! `hvac` client to read a KV v2 secret and fell back to KV v1 on a 404. No
//! `hvac`-equivalent crate is in the adopted dependency stack, so this talks
//! to Vault's HTTP API directly with `reqwest`, the same crate already used
//! for the HTTP collector and sinks.

use async_trait::async_trait;
use serde_json::Value;

use super::SecretProvider;

/// Resolves secrets by reading `{addr}/v1/{base_path}/{id}` (KV v2 shape),
/// falling back to the KV v1 layout at `{addr}/v1/{base_path_v1}/{id}` when
/// the server reports the path does not exist.
#[derive(Debug, Clone)]
pub struct VaultSecretProvider {
    client: reqwest::Client,
    addr: String,
    token: String,
    base_path: String,
}

impl VaultSecretProvider {
    /// Build a provider against a Vault server, using `base_path` as the
    /// KV v2 mount's `data` path prefix (e.g. `secret/data`).
    #[must_use]
    pub fn new(addr: impl Into<String>, token: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            addr: addr.into(),
            token: token.into(),
            base_path: base_path.into(),
        }
    }

    async fn read(&self, path: &str) -> Option<Value> {
        let url = format!("{}/v1/{path}", self.addr.trim_end_matches('/'));
        let resp = self
            .client
            .get(url)
            .header("X-Vault-Token", &self.token)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            return None;
        }
        resp.json::<Value>().await.ok()
    }

    fn v1_path(&self) -> String {
        self.base_path.replacen("/data", "", 1)
    }
}

#[async_trait]
impl SecretProvider for VaultSecretProvider {
    async fn get_secret(&self, id: &str) -> Option<String> {
        let (mount_path, key) = id.split_once('#').unwrap_or((id, "value"));

        let v2_path = format!("{}/{mount_path}", self.base_path);
        if let Some(body) = self.read(&v2_path).await {
            if let Some(v) = body.pointer("/data/data").and_then(|d| d.get(key)) {
                return v.as_str().map(str::to_string);
            }
        }

        let v1_path = format!("{}/{mount_path}", self.v1_path());
        let body = self.read(&v1_path).await?;
        body.pointer("/data")
            .and_then(|d| d.get(key))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_path_strips_data_segment() {
        let provider = VaultSecretProvider::new("http://vault", "t", "secret/data");
        assert_eq!(provider.v1_path(), "secret");
    }
}
