//! Chain execution: drive an ordered list of stages through the capability
//! invoker and turn every outcome into a [`ChainRunReport`].

pub mod executor;
pub mod report;
pub mod stage;

pub use executor::{ChainExecutor, Pipeline};
pub use report::{ChainRunReport, FailureKind, Outcome};
pub use stage::{
    ChainContext, FieldBinding, OutputParser, OutputSpec, ParamBuilder, ParamSource,
    PipelineStage, StageOutput,
};

use crate::error::InvocationError;
use thiserror::Error;

/// Why a run stopped before its last stage.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainAbort {
    #[error("{service} is offline (not discovered)")]
    ServiceOffline { service: String },

    #[error("Invalid stage input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Invocation(#[from] InvocationError),

    #[error("Malformed stage output: {0}")]
    MalformedOutput(String),

    #[error("Stage rejected: {0}")]
    Rejected(String),

    #[error("Orchestrator is shutting down")]
    ShuttingDown,
}

impl ChainAbort {
    pub fn kind(&self) -> FailureKind {
        match self {
            ChainAbort::ServiceOffline { .. } => FailureKind::ServiceOffline,
            ChainAbort::InvalidInput(_) => FailureKind::InvalidInput,
            ChainAbort::Invocation(InvocationError::CapabilityNotFound { .. }) => {
                FailureKind::CapabilityNotFound
            }
            ChainAbort::Invocation(InvocationError::Transport { .. }) => FailureKind::Transport,
            ChainAbort::Invocation(InvocationError::RemoteExecution { .. }) => {
                FailureKind::RemoteExecution
            }
            ChainAbort::MalformedOutput(_) => FailureKind::MalformedOutput,
            ChainAbort::Rejected(_) => FailureKind::Rejected,
            ChainAbort::ShuttingDown => FailureKind::ShuttingDown,
        }
    }
}
