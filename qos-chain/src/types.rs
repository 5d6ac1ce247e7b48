//! Agent Card and A2A wire types.
//!
//! Field names follow the JSON the deployed agents already speak, so the serde
//! attributes here are the protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// JSON object payload carried by envelopes, results and stage outputs.
pub type JsonMap = Map<String, JsonValue>;

pub const CARD_VERSION: &str = "1.0";
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Conventional path of the metadata endpoint on every agent.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";
/// Conventional path of the invocation endpoint on every agent.
pub const A2A_PATH: &str = "/a2a";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    #[default]
    String,
    Number,
    Object,
}

/// Declared shape of one parameter or return value. Documentation only; nothing
/// validates payloads against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type", default)]
    pub kind: ParamKind,
    #[serde(default)]
    pub description: String,
}

impl ParamSpec {
    pub fn new(kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    pub fn object(description: impl Into<String>) -> Self {
        Self::new(ParamKind::Object, description)
    }
}

/// A capability as advertised on an Agent Card. Its name is the key it is stored
/// under in [`AgentCard::capabilities`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamSpec>,
    #[serde(default)]
    pub returns: BTreeMap<String, ParamSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Authentication {
    #[default]
    None,
    Bearer,
}

/// Service directory entry: metadata published by an agent for discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCard {
    #[serde(default = "default_card_version")]
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Invocation endpoint, e.g. `http://localhost:8001/a2a`.
    pub endpoint: String,
    #[serde(default)]
    pub authentication: Authentication,
    pub capabilities: BTreeMap<String, CapabilityDescriptor>,
    /// Credential supplied locally by configuration, never published.
    #[serde(skip)]
    pub auth_token: Option<String>,
}

fn default_card_version() -> String {
    CARD_VERSION.to_string()
}

impl AgentCard {
    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.contains_key(capability)
    }

    /// Check the parts of a card that the invoker relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("agent card has an empty name".to_string());
        }
        let endpoint = url::Url::parse(&self.endpoint)
            .map_err(|e| format!("endpoint '{}' is not a valid URL: {}", self.endpoint, e))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            ));
        }
        Ok(())
    }
}

/// Body of an A2A message: which capability to run, with which arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationPayload {
    #[serde(default)]
    pub capability: String,
    #[serde(default)]
    pub params: JsonMap,
}

/// Uniform request wrapper for every cross-agent call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2AMessage {
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    pub payload: InvocationPayload,
}

fn default_content_type() -> String {
    JSON_CONTENT_TYPE.to_string()
}

impl A2AMessage {
    pub fn new(
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        capability: impl Into<String>,
        params: JsonMap,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            content_type: default_content_type(),
            payload: InvocationPayload {
                capability: capability.into(),
                params,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Failure,
}

/// Response body of the invocation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct A2AResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl A2AResponse {
    pub fn success(result: JsonMap) -> Self {
        Self {
            status: ResponseStatus::Success,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Collapse into the tagged result the invoker works with.
    pub fn into_result(self) -> InvocationResult {
        match self.status {
            ResponseStatus::Success => InvocationResult::Success(self.result.unwrap_or_default()),
            ResponseStatus::Failure => InvocationResult::Failure(
                self.error
                    .unwrap_or_else(|| "Unknown remote error".to_string()),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Success(JsonMap),
    Failure(String),
}
