use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{metadata::DappMetadata, network::SolanaNetwork};

pub const ENV_EMBEDDED_WALLET_KEY: &str = "WALLET_SESSION_EMBEDDED_WALLET_KEY";
pub const ENV_DESIRED_CHAIN_ID: &str = "WALLET_SESSION_DESIRED_CHAIN_ID";
pub const ENV_SOLANA_NETWORK: &str = "WALLET_SESSION_SOLANA_NETWORK";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// How concurrent `connect` calls for one ecosystem are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectOrdering {
    /// Whichever handshake resolves last sets the account.
    #[default]
    Resolution,
    /// Results of attempts superseded by a newer `connect` call are dropped.
    LatestAttempt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub dapp: DappMetadata,
    pub desired_chain_id: Option<u64>,
    pub embedded_wallet_key: Option<String>,
    pub solana_network: SolanaNetwork,
    pub rpc_overrides: HashMap<u64, Url>,
    pub connect_ordering: ConnectOrdering,
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `WALLET_SESSION_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = var(ENV_EMBEDDED_WALLET_KEY) {
            self.embedded_wallet_key = Some(key);
        }

        if let Some(value) = var(ENV_DESIRED_CHAIN_ID).filter(|v| !v.trim().is_empty()) {
            let chain_id = value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_DESIRED_CHAIN_ID,
                value: value.clone(),
            })?;
            self.desired_chain_id = Some(chain_id);
        }

        if let Some(value) = var(ENV_SOLANA_NETWORK).filter(|v| !v.trim().is_empty()) {
            self.solana_network = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: ENV_SOLANA_NETWORK,
                    value: value.clone(),
                })?;
        }

        Ok(self)
    }

    pub fn with_dapp(mut self, dapp: DappMetadata) -> Self {
        self.dapp = dapp;
        self
    }

    pub fn with_desired_chain(mut self, chain_id: u64) -> Self {
        self.desired_chain_id = Some(chain_id);
        self
    }

    pub fn with_embedded_wallet_key(mut self, key: &str) -> Self {
        self.embedded_wallet_key = Some(key.to_string());
        self
    }

    pub fn with_connect_ordering(mut self, ordering: ConnectOrdering) -> Self {
        self.connect_ordering = ordering;
        self
    }

    /// The embedded wallet API key, if one is set and non-blank.
    pub fn embedded_wallet_key(&self) -> Option<&str> {
        self.embedded_wallet_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(
        pairs: &'a [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.desired_chain_id, None);
        assert_eq!(config.embedded_wallet_key(), None);
        assert_eq!(config.solana_network, SolanaNetwork::MainnetBeta);
        assert_eq!(config.connect_ordering, ConnectOrdering::Resolution);
    }

    #[test]
    fn test_env_overrides() {
        let config = SessionConfig::default()
            .apply_vars(vars(&[
                (ENV_EMBEDDED_WALLET_KEY, "pk_live_abc"),
                (ENV_DESIRED_CHAIN_ID, "137"),
                (ENV_SOLANA_NETWORK, "devnet"),
            ]))
            .unwrap();
        assert_eq!(config.embedded_wallet_key(), Some("pk_live_abc"));
        assert_eq!(config.desired_chain_id, Some(137));
        assert_eq!(config.solana_network, SolanaNetwork::Devnet);
    }

    #[test]
    fn test_env_rejects_bad_chain_id() {
        let result = SessionConfig::default().apply_vars(vars(&[(ENV_DESIRED_CHAIN_ID, "poly")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let config = SessionConfig::default().apply_vars(vars(&[(ENV_EMBEDDED_WALLET_KEY, "  ")]));
        assert_eq!(config.unwrap().embedded_wallet_key(), None);
    }

    #[test]
    fn test_from_json() {
        let config = SessionConfig::from_json(
            r#"{
                "dapp": { "name": "dashboard", "url": "https://example.com" },
                "desiredChainId": 5,
                "solanaNetwork": "devnet",
                "rpcOverrides": { "5": "https://rpc.example.com/goerli" },
                "connectOrdering": "latest-attempt"
            }"#,
        )
        .unwrap();
        assert_eq!(config.dapp.name, "dashboard");
        assert_eq!(config.desired_chain_id, Some(5));
        assert_eq!(config.rpc_overrides[&5].as_str(), "https://rpc.example.com/goerli");
        assert_eq!(config.connect_ordering, ConnectOrdering::LatestAttempt);
    }
}
