//! Endpoints and tuning knobs for [`crate::client::IntentsClient`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Solver relay JSON-RPC endpoint (`quote`, `publish_intent`, `get_status`).
    pub relay_url: String,

    /// Bridge JSON-RPC endpoint (`supported_tokens`, `deposit_address`).
    pub bridge_url: String,

    /// Token metadata and price listing.
    pub tokens_api_url: String,

    /// NEAR JSON-RPC node used for settlement contract view calls.
    pub near_rpc_url: String,

    /// Settlement contract account.
    pub verifying_contract: String,

    pub request_timeout_secs: u64,

    pub max_nonce_attempts: u32,

    pub poll: PollConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: "https://solver-relay-v2.chaindefuser.com/rpc".to_string(),
            bridge_url: "https://bridge.chaindefuser.com/rpc".to_string(),
            tokens_api_url: "https://api-mng-console.chaindefuser.com/api/tokens".to_string(),
            near_rpc_url: "https://rpc.mainnet.near.org".to_string(),
            verifying_contract: "intents.near".to_string(),
            request_timeout_secs: 30,
            max_nonce_attempts: 5,
            poll: PollConfig::default(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            max_attempts: 30,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse from TOML; missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        let config = Self::parse_toml(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, then apply environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::load(&contents, |var| std::env::var(var).ok())
    }

    /// Defaults with environment overrides, for running without a file.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override endpoints from `ALTENTS_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|var| std::env::var(var).ok());
    }

    /// Validated once, after overrides, so a file may carry placeholders
    /// that the environment replaces.
    fn load(contents: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::parse_toml(contents)?;
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    fn parse_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("invalid TOML: {e}")))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            ("ALTENTS_RELAY_URL", &mut self.relay_url),
            ("ALTENTS_BRIDGE_URL", &mut self.bridge_url),
            ("ALTENTS_TOKENS_API_URL", &mut self.tokens_api_url),
            ("ALTENTS_NEAR_RPC_URL", &mut self.near_rpc_url),
        ];
        for (var, field) in overrides {
            if let Some(value) = lookup(var) {
                debug!("Overriding {} from environment", var);
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let urls = [
            ("relay_url", &self.relay_url),
            ("bridge_url", &self.bridge_url),
            ("tokens_api_url", &self.tokens_api_url),
            ("near_rpc_url", &self.near_rpc_url),
        ];
        for (name, url) in urls {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }

        if self.verifying_contract.is_empty() {
            return Err(Error::Config("verifying_contract is empty".to_string()));
        }
        if self.max_nonce_attempts == 0 {
            return Err(Error::Config("max_nonce_attempts must be at least 1".to_string()));
        }
        if self.poll.max_attempts == 0 {
            return Err(Error::Config("poll.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}
