//! RPC endpoint configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use txlens_core::Network;

use crate::error::ConfigError;

/// Rootstock public mainnet node.
pub const DEFAULT_MAINNET_URL: &str = "https://public-node.rsk.co";
/// Rootstock public testnet node.
pub const DEFAULT_TESTNET_URL: &str = "https://public-node.testnet.rsk.co";

pub const ENV_MAINNET: &str = "TXLENS_RPC_MAINNET";
pub const ENV_TESTNET: &str = "TXLENS_RPC_TESTNET";
pub const ENV_TIMEOUT_MS: &str = "TXLENS_RPC_TIMEOUT_MS";

/// One endpoint per network plus the per-call timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcConfig {
    #[serde(default = "default_mainnet_url")]
    pub mainnet_url: String,
    #[serde(default = "default_testnet_url")]
    pub testnet_url: String,
    /// Budget for a single RPC call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_mainnet_url() -> String {
    DEFAULT_MAINNET_URL.into()
}

fn default_testnet_url() -> String {
    DEFAULT_TESTNET_URL.into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            mainnet_url: default_mainnet_url(),
            testnet_url: default_testnet_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RpcConfig {
    /// Apply `TXLENS_RPC_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_MAINNET) {
            self.mainnet_url = url;
        }
        if let Some(url) = lookup(ENV_TESTNET) {
            self.testnet_url = url;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = ms.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_MS.into(),
                value: ms.clone(),
            })?;
        }
        Ok(())
    }

    /// Check both endpoints parse as http(s) URLs and the timeout is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for network in [Network::Mainnet, Network::Testnet] {
            let raw = self.url_for(network);
            let invalid = |reason: String| ConfigError::InvalidUrl {
                network,
                url: raw.to_string(),
                reason,
            };
            let parsed = url::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
            }
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn url_for(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet_url,
            Network::Testnet => &self.testnet_url,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_public_nodes() {
        let cfg = RpcConfig::default();
        assert_eq!(cfg.url_for(Network::Mainnet), "https://public-node.rsk.co");
        assert_eq!(cfg.url_for(Network::Testnet), "https://public-node.testnet.rsk.co");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        cfg.validate().unwrap();
    }

    #[test]
    fn yaml_partial_uses_defaults() {
        let cfg: RpcConfig = serde_yaml::from_str("timeout_ms: 2500\n").unwrap();
        assert_eq!(cfg.timeout_ms, 2500);
        assert_eq!(cfg.mainnet_url, DEFAULT_MAINNET_URL);
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_TESTNET, "http://localhost:4444"),
            (ENV_TIMEOUT_MS, "500"),
        ]
        .into_iter()
        .collect();
        let mut cfg = RpcConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.testnet_url, "http://localhost:4444");
        assert_eq!(cfg.mainnet_url, DEFAULT_MAINNET_URL);
        assert_eq!(cfg.timeout_ms, 500);

        let err = cfg
            .apply_env(|k| (k == ENV_TIMEOUT_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn invalid_urls_rejected() {
        let cfg = RpcConfig {
            mainnet_url: "not a url".into(),
            ..RpcConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidUrl { network: Network::Mainnet, .. })
        ));
        let cfg = RpcConfig {
            testnet_url: "ws://localhost:4445".into(),
            ..RpcConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = RpcConfig {
            timeout_ms: 0,
            ..RpcConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroTimeout)));
    }
}
