//! Sequential chain interpreter.
//!
//! Per run: PENDING -> RUNNING(stage i) -> RUNNING(stage i+1) | ABORTED | COMPLETED.
//! Stage i+1 never starts before stage i's call has returned, and nothing after an
//! aborted stage is invoked. Completed stages are not compensated on a later abort.

use super::report::{ChainRunReport, Outcome};
use super::stage::{ChainContext, PipelineStage, StageOutput};
use super::ChainAbort;
use crate::directory::AgentDirectory;
use crate::invoker::CapabilityInvocation;
use crate::types::JsonMap;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub type SummaryFn = Arc<dyn Fn(&JsonMap) -> Option<String> + Send + Sync>;

/// A named, ordered list of stages.
#[derive(Clone)]
pub struct Pipeline {
    name: String,
    stages: Vec<PipelineStage>,
    summary: Option<SummaryFn>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, stages: Vec<PipelineStage>) -> Self {
        Self {
            name: name.into(),
            stages,
            summary: None,
        }
    }

    /// Extra sentence appended to the success message, built from the details.
    pub fn with_summary<F>(mut self, summary: F) -> Self
    where
        F: Fn(&JsonMap) -> Option<String> + Send + Sync + 'static,
    {
        self.summary = Some(Arc::new(summary));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .finish()
    }
}

struct RunState {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    completed: Vec<String>,
    details: JsonMap,
}

pub struct ChainExecutor {
    pipeline: Pipeline,
    directory: AgentDirectory,
    invoker: Arc<dyn CapabilityInvocation>,
    accepting: AtomicBool,
}

impl ChainExecutor {
    pub fn new(
        pipeline: Pipeline,
        directory: AgentDirectory,
        invoker: Arc<dyn CapabilityInvocation>,
    ) -> Self {
        Self {
            pipeline,
            directory,
            invoker,
            accepting: AtomicBool::new(true),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Refuse new runs. Runs already in progress carry on.
    pub fn begin_shutdown(&self) {
        if self.accepting.swap(false, Ordering::SeqCst) {
            info!(pipeline = %self.pipeline.name, "chain executor no longer accepting runs");
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Run the whole chain once. Never fails: every outcome is a report.
    pub async fn run(&self, trigger: JsonMap) -> ChainRunReport {
        let state = RunState {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            completed: Vec::new(),
            details: JsonMap::new(),
        };
        let span = info_span!("chain_run", run_id = %state.run_id, pipeline = %self.pipeline.name);
        self.drive(state, trigger).instrument(span).await
    }

    async fn drive(&self, mut state: RunState, trigger: JsonMap) -> ChainRunReport {
        if !self.is_accepting() {
            warn!("run refused, shutdown in progress");
            return self.aborted(state, None, ChainAbort::ShuttingDown);
        }

        let total = self.pipeline.stages.len();
        let mut ctx = ChainContext::new(trigger);
        for (i, stage) in self.pipeline.stages.iter().enumerate() {
            info!(stage = %stage.name, step = i + 1, total, agent = %stage.service, "running stage");
            match self.run_stage(stage, &ctx).await {
                Ok(StageOutput::Accepted { carry, details }) => {
                    ctx.advance(carry);
                    for (key, value) in details {
                        state.details.insert(key, value);
                    }
                    state.completed.push(stage.name.clone());
                }
                Ok(StageOutput::Rejected(reason)) => {
                    return self.aborted(state, Some(stage), ChainAbort::Rejected(reason));
                }
                Err(abort) => return self.aborted(state, Some(stage), abort),
            }
        }

        let mut message = format!(
            "{} completed successfully after {} stages.",
            self.pipeline.name, total
        );
        if let Some(extra) = self.pipeline.summary.as_ref().and_then(|f| f(&state.details)) {
            message.push(' ');
            message.push_str(&extra);
        }
        info!(%message, "chain completed");
        ChainRunReport {
            run_id: state.run_id,
            pipeline: self.pipeline.name.clone(),
            outcome: Outcome::Success,
            message,
            failed_stage: None,
            failure_kind: None,
            completed_stages: state.completed,
            details: state.details,
            started_at: state.started_at,
            finished_at: Utc::now(),
        }
    }

    async fn run_stage(
        &self,
        stage: &PipelineStage,
        ctx: &ChainContext,
    ) -> Result<StageOutput, ChainAbort> {
        if !self.directory.contains(&stage.service).await {
            return Err(ChainAbort::ServiceOffline {
                service: stage.service.clone(),
            });
        }
        let params = stage.params.build(ctx).map_err(ChainAbort::InvalidInput)?;
        let output = self
            .invoker
            .invoke(&stage.service, &stage.capability, params)
            .await?;
        stage.output.parse(output).map_err(ChainAbort::MalformedOutput)
    }

    fn aborted(
        &self,
        state: RunState,
        stage: Option<&PipelineStage>,
        abort: ChainAbort,
    ) -> ChainRunReport {
        let message = match stage {
            Some(stage) => format!(
                "{} failed at {}. Error: {}",
                self.pipeline.name, stage.name, abort
            ),
            None => format!("{} was not started. Error: {}", self.pipeline.name, abort),
        };
        error!(
            failed_stage = stage.map(|s| s.name.as_str()),
            kind = ?abort.kind(),
            %message,
            "chain aborted"
        );
        ChainRunReport {
            run_id: state.run_id,
            pipeline: self.pipeline.name.clone(),
            outcome: Outcome::Failure,
            message,
            failed_stage: stage.map(|s| s.name.clone()),
            failure_kind: Some(abort.kind()),
            completed_stages: state.completed,
            details: state.details,
            started_at: state.started_at,
            finished_at: Utc::now(),
        }
    }
}
