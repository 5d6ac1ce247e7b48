//! Business payloads exchanged by the QoS repair chain, and the chain itself.

pub mod qos;

pub use qos::{qos_pipeline, QOS_PIPELINE_NAME};

use crate::types::JsonMap;
use serde::{Deserialize, Serialize};

fn default_root_cause_hint() -> String {
    "High traffic causing latency.".to_string()
}

fn default_device_type() -> String {
    "Cisco".to_string()
}

/// Raised by the monitor when a metric crosses its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmData {
    pub alarm_id: String,
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: String,
    #[serde(default = "default_root_cause_hint")]
    pub root_cause_hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationPlan {
    pub plan_id: String,
    pub device_id: String,
    pub priority: i64,
    pub actions: JsonMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    pub cli_text: String,
    #[serde(default = "default_device_type")]
    pub device_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub report: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    Success,
    Failure,
    Rollback,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Success => "Success",
            DeploymentStatus::Failure => "Failure",
            DeploymentStatus::Rollback => "Rollback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: DeploymentStatus,
    pub log: String,
}
