//! Profiles of the standard QoS agents and the Agent Cards they publish.

use crate::types::{
    AgentCard, Authentication, CapabilityDescriptor, ParamKind, ParamSpec, A2A_PATH,
    AGENT_CARD_PATH, CARD_VERSION,
};
use std::collections::BTreeMap;

pub const QOS_MONITOR_AGENT: &str = "QoS Monitor Agent";
pub const QOS_REMEDIATION_AGENT: &str = "QoS Remediation Agent";
pub const CONFIG_GENERATION_AGENT: &str = "Config Generation Agent";
pub const CONFIG_VALIDATION_AGENT: &str = "Config Validation Agent";
pub const CONFIG_EXECUTION_AGENT: &str = "Config Execution Agent";
pub const ORCHESTRATION_AGENT: &str = "Orchestration Agent";

/// Capability the orchestrator answers to start one chain run.
pub const START_CHAIN_CAPABILITY: &str = "start_qos_chain";

/// Static description of one agent: where it listens and the single capability it offers.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub name: String,
    pub port: u16,
    pub description: String,
    pub capability: String,
    pub params: BTreeMap<String, ParamSpec>,
    pub returns: BTreeMap<String, ParamSpec>,
}

impl AgentProfile {
    pub fn new(
        name: impl Into<String>,
        port: u16,
        description: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            port,
            description: description.into(),
            capability: capability.into(),
            params: BTreeMap::new(),
            returns: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, spec: ParamSpec) -> Self {
        self.params.insert(name.to_string(), spec);
        self
    }

    pub fn returns(mut self, name: &str, spec: ParamSpec) -> Self {
        self.returns.insert(name.to_string(), spec);
        self
    }

    pub fn base_url(&self, host: &str) -> String {
        format!("http://{}:{}", host, self.port)
    }

    pub fn card_url(&self, host: &str) -> String {
        format!("{}{}", self.base_url(host), AGENT_CARD_PATH)
    }

    /// The card this agent publishes when reachable at `host`.
    pub fn card(&self, host: &str) -> AgentCard {
        let mut capabilities = BTreeMap::new();
        capabilities.insert(
            self.capability.clone(),
            CapabilityDescriptor {
                description: self.description.clone(),
                parameters: self.params.clone(),
                returns: self.returns.clone(),
            },
        );
        AgentCard {
            version: CARD_VERSION.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            endpoint: format!("{}{}", self.base_url(host), A2A_PATH),
            authentication: Authentication::None,
            capabilities,
            auth_token: None,
        }
    }
}

/// The six agents of the QoS system, pipeline order first, orchestrator last.
pub fn standard_profiles() -> Vec<AgentProfile> {
    vec![
        AgentProfile::new(
            QOS_MONITOR_AGENT,
            8001,
            "Trigger: watches the time-series store and raises a structured alarm when QoS degrades.",
            "monitor_and_alarm",
        )
        .returns("alarm_data", ParamSpec::object("Structured alarm data")),
        AgentProfile::new(
            QOS_REMEDIATION_AGENT,
            8002,
            "Decision maker: builds a high-level JSON remediation plan from the alarm and the network topology.",
            "generate_remediation_plan",
        )
        .param("alarm_data", ParamSpec::object("Structured alarm data"))
        .param("topology", ParamSpec::object("Network topology"))
        .returns("remediation_plan", ParamSpec::object("High-level JSON remediation plan")),
        AgentProfile::new(
            CONFIG_GENERATION_AGENT,
            8003,
            "Translator: turns the JSON remediation plan into device CLI configuration text.",
            "generate_cli_config",
        )
        .param("remediation_plan", ParamSpec::object("High-level JSON remediation plan"))
        .returns("cli_config", ParamSpec::object("Device CLI configuration text")),
        AgentProfile::new(
            CONFIG_VALIDATION_AGENT,
            8004,
            "Quality control: checks configuration syntax and compliance.",
            "validate_config",
        )
        .param("cli_config", ParamSpec::object("CLI configuration text"))
        .returns("validation_result", ParamSpec::object("Validation verdict and report")),
        AgentProfile::new(
            CONFIG_EXECUTION_AGENT,
            8005,
            "Implementer: deploys the configuration through the device management interface.",
            "execute_config",
        )
        .param("cli_config", ParamSpec::object("CLI configuration text"))
        .returns("execution_status", ParamSpec::object("Deployment status")),
        orchestrator_profile(ORCHESTRATION_AGENT, 8006),
    ]
}

/// The orchestrator itself, under whatever name and port it is configured with.
pub fn orchestrator_profile(name: &str, port: u16) -> AgentProfile {
    AgentProfile::new(
        name,
        port,
        "Orchestrator: runs the QoS repair chain by calling the other agents in sequence.",
        START_CHAIN_CAPABILITY,
    )
    .param("initial_trigger", ParamSpec::new(ParamKind::String, "Start signal, may be empty"))
    .returns("final_report", ParamSpec::object("Final chain report"))
}

pub fn profile(name: &str) -> Option<AgentProfile> {
    standard_profiles().into_iter().find(|p| p.name == name)
}
