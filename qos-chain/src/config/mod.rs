//! Orchestrator configuration: TOML file, defaults and validation.

pub mod types;

pub use types::*;

use crate::error::ConfigError;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::path::Path;

impl OrchestratorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: OrchestratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_name.trim().is_empty() {
            return Err(ConfigError::Invalid("agent_name must not be empty".to_string()));
        }
        if self.discovery.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "discovery.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.invocation.timeout_ms == 0 || self.discovery.probe_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".to_string()));
        }

        let mut seen = HashSet::new();
        for agent in &self.agents {
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "agent '{}' is configured more than once",
                    agent.name
                )));
            }
            let url = url::Url::parse(&agent.card_url).map_err(|e| {
                ConfigError::Invalid(format!(
                    "agent '{}' has an invalid card_url '{}': {}",
                    agent.name, agent.card_url, e
                ))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "agent '{}' card_url must use http or https",
                    agent.name
                )));
            }
        }
        Ok(())
    }

    /// Read the topology document the remediation stage receives.
    pub fn load_topology(&self) -> Result<JsonValue, ConfigError> {
        let path = &self.topology_path;
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Topology {
            path: path.clone(),
            source,
        })
    }
}
