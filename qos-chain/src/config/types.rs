use crate::agents::{standard_profiles, ORCHESTRATION_AGENT};
use crate::discovery::DiscoveryTarget;
use crate::transport::TransportTimeouts;
use crate::utils::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Orchestrator settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Name used as `sender_id` and published on the orchestrator's own card
    pub agent_name: String,
    pub host: String,
    pub port: u16,
    /// JSON network topology handed to the remediation stage
    pub topology_path: PathBuf,
    pub discovery: DiscoveryConfig,
    pub invocation: InvocationConfig,
    /// Agents to discover at start-up, in pipeline order
    pub agents: Vec<AgentEndpointConfig>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        let host = "localhost".to_string();
        let agents = standard_profiles()
            .into_iter()
            .filter(|p| p.name != ORCHESTRATION_AGENT)
            .map(|p| AgentEndpointConfig {
                card_url: p.card_url(&host),
                name: p.name,
                auth_token: None,
            })
            .collect();
        Self {
            agent_name: ORCHESTRATION_AGENT.to_string(),
            host,
            port: 8006,
            topology_path: PathBuf::from("topology.json"),
            discovery: DiscoveryConfig::default(),
            invocation: InvocationConfig::default(),
            agents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            retry_delay_ms: 1500,
            probe_timeout_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationConfig {
    pub timeout_ms: u64,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self { timeout_ms: 60_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEndpointConfig {
    pub name: String,
    pub card_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl OrchestratorConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.discovery.max_attempts,
            Duration::from_millis(self.discovery.retry_delay_ms),
        )
    }

    pub fn timeouts(&self) -> TransportTimeouts {
        TransportTimeouts {
            probe: Duration::from_millis(self.discovery.probe_timeout_ms),
            invocation: Duration::from_millis(self.invocation.timeout_ms),
        }
    }

    pub fn targets(&self) -> Vec<DiscoveryTarget> {
        self.agents
            .iter()
            .map(|agent| {
                let target = DiscoveryTarget::new(&agent.name, &agent.card_url);
                match &agent.auth_token {
                    Some(token) => target.with_auth_token(token),
                    None => target,
                }
            })
            .collect()
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
