//! `txlens.yaml`: RPC endpoints and logging.
//!
//! ```yaml
//! rpc:
//!   mainnet_url: https://public-node.rsk.co
//!   testnet_url: https://public-node.testnet.rsk.co
//!   timeout_ms: 10000
//! log:
//!   level: warn
//!   components:
//!     txlens-rpc: info
//!   json: false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use txlens_observability::LogConfig;
use txlens_rpc::RpcConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("parse config YAML")
    }

    /// Defaults when `path` is `None`, then `TXLENS_RPC_*` overrides, then
    /// endpoint validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("read config '{}'", p.display()))?;
                Self::from_yaml_str(&text)?
            }
            None => Self::default(),
        };
        config.finish(|key| std::env::var(key).ok())
    }

    fn finish<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.rpc.apply_env(lookup)?;
        self.rpc.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use txlens_rpc::config::{DEFAULT_TESTNET_URL, ENV_MAINNET};

    #[test]
    fn empty_file_takes_defaults() {
        let cfg = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.rpc.testnet_url, DEFAULT_TESTNET_URL);
        assert_eq!(cfg.log.level, "warn");
    }

    #[test]
    fn nested_sections() {
        let yaml = "rpc:\n  timeout_ms: 2500\nlog:\n  level: debug\n  json: true\n";
        let cfg = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.rpc.timeout_ms, 2500);
        assert_eq!(cfg.log.level, "debug");
        assert!(cfg.log.json);
    }

    #[test]
    fn env_override_is_validated() {
        let env: HashMap<&str, &str> = [(ENV_MAINNET, "http://localhost:4444")].into();
        let cfg = AppConfig::default()
            .finish(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(cfg.rpc.mainnet_url, "http://localhost:4444");

        let bad: HashMap<&str, &str> = [(ENV_MAINNET, "ws://localhost:4445")].into();
        assert!(AppConfig::default()
            .finish(|k| bad.get(k).map(|v| v.to_string()))
            .is_err());
    }
}
