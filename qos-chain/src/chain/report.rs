use crate::types::JsonMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// Why a run aborted, for callers that alert or remediate differently per cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ServiceOffline,
    CapabilityNotFound,
    Transport,
    RemoteExecution,
    MalformedOutput,
    Rejected,
    InvalidInput,
    ShuttingDown,
}

/// Terminal result of one chain run. Always produced, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRunReport {
    pub run_id: Uuid,
    pub pipeline: String,
    pub outcome: Outcome,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// Stages that ran to acceptance, in order. Their remote effects are not
    /// undone when a later stage aborts.
    pub completed_stages: Vec<String>,
    /// Identifiers and artifacts reported by the completed stages.
    pub details: JsonMap,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ChainRunReport {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
