//! The five-stage QoS repair chain: monitor, plan, generate, validate, execute.

use super::{AlarmData, CliConfig, ExecutionStatus, RemediationPlan, ValidationResult};
use crate::agents::{
    CONFIG_EXECUTION_AGENT, CONFIG_GENERATION_AGENT, CONFIG_VALIDATION_AGENT, QOS_MONITOR_AGENT,
    QOS_REMEDIATION_AGENT,
};
use crate::chain::{FieldBinding, ParamSource, Pipeline, PipelineStage, StageOutput};
use crate::types::JsonMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};

pub const QOS_PIPELINE_NAME: &str = "QoS repair chain";

/// Pull `key` out of a stage result and check it against its model.
fn typed<T: DeserializeOwned>(output: &JsonMap, key: &str) -> Result<(T, JsonValue), String> {
    let raw = output
        .get(key)
        .cloned()
        .ok_or_else(|| format!("missing field '{}'", key))?;
    let value = serde_json::from_value(raw.clone())
        .map_err(|e| format!("invalid field '{}': {}", key, e))?;
    Ok((value, raw))
}

fn single(key: &str, value: JsonValue) -> JsonMap {
    let mut map = JsonMap::new();
    map.insert(key.to_string(), value);
    map
}

/// Build the QoS repair chain. `topology` is handed to the remediation stage verbatim.
pub fn qos_pipeline(topology: JsonValue) -> Pipeline {
    let monitor = PipelineStage::new("qos_monitor", QOS_MONITOR_AGENT, "monitor_and_alarm")
        .with_params(ParamSource::Trigger)
        .with_output_parser(|output| {
            // A healthy reading carries no alarm; there is nothing to remediate.
            let (alarm, raw) = typed::<AlarmData>(&output, "alarm_data")?;
            Ok(StageOutput::Accepted {
                carry: single("alarm_data", raw),
                details: single("alarm_id", json!(alarm.alarm_id)),
            })
        });

    let remediation = PipelineStage::new(
        "qos_remediation",
        QOS_REMEDIATION_AGENT,
        "generate_remediation_plan",
    )
    .with_params(ParamSource::Fields(vec![
        FieldBinding::carried("alarm_data"),
        FieldBinding::constant("topology", topology),
    ]))
    .with_output_parser(|output| {
        let (plan, raw) = typed::<RemediationPlan>(&output, "remediation_plan")?;
        Ok(StageOutput::Accepted {
            carry: single("remediation_plan", raw),
            details: single("plan_id", json!(plan.plan_id)),
        })
    });

    let generation = PipelineStage::new(
        "config_generation",
        CONFIG_GENERATION_AGENT,
        "generate_cli_config",
    )
    .with_params(ParamSource::Fields(vec![FieldBinding::carried("remediation_plan")]))
    .with_output_parser(|output| {
        let (config, raw) = typed::<CliConfig>(&output, "cli_config")?;
        Ok(StageOutput::Accepted {
            carry: single("cli_config", raw),
            details: single("deployed_config", json!(config.cli_text)),
        })
    });

    let validation = PipelineStage::new(
        "config_validation",
        CONFIG_VALIDATION_AGENT,
        "validate_config",
    )
    .with_params(ParamSource::Fields(vec![FieldBinding::carried("cli_config")]))
    .with_output_parser(|output| {
        let (verdict, raw) = typed::<ValidationResult>(&output, "validation_result")?;
        if !verdict.is_valid {
            return Ok(StageOutput::Rejected(format!(
                "Validation Failed: {}",
                verdict.report
            )));
        }
        Ok(StageOutput::Accepted {
            carry: single("validation_result", raw),
            details: JsonMap::new(),
        })
    });

    let execution = PipelineStage::new(
        "config_execution",
        CONFIG_EXECUTION_AGENT,
        "execute_config",
    )
    .with_params(ParamSource::Fields(vec![FieldBinding::carried("cli_config")]))
    .with_output_parser(|output| {
        // Any parsed status completes the chain; Failure and Rollback surface in the report.
        let (status, raw) = typed::<ExecutionStatus>(&output, "execution_status")?;
        let mut details = single("execution_status", json!(status.status.as_str()));
        details.insert("execution_log".to_string(), json!(status.log));
        Ok(StageOutput::Accepted {
            carry: single("execution_status", raw),
            details,
        })
    });

    Pipeline::new(
        QOS_PIPELINE_NAME,
        vec![monitor, remediation, generation, validation, execution],
    )
    .with_summary(|details| {
        details
            .get("execution_status")
            .and_then(JsonValue::as_str)
            .map(|status| format!("Execution status: {}.", status))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainExecutor, FailureKind, Outcome};
    use crate::directory::AgentDirectory;
    use crate::invoker::CapabilityInvoker;
    use crate::test_support::{card, json_map, StubTransport};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn alarm() -> JsonValue {
        json!({
            "alarm_id": "ALM-7",
            "metric": "latency_ms",
            "value": 182.0,
            "threshold": 100.0,
            "timestamp": "2024-05-01T10:00:00Z"
        })
    }

    async fn wired(execution: JsonValue) -> (ChainExecutor, Arc<StubTransport>) {
        let stub = Arc::new(StubTransport::new());
        let directory = AgentDirectory::new();
        let agents = [
            (QOS_MONITOR_AGENT, 8001, "monitor_and_alarm", json!({"status": "Alarm", "alarm_data": alarm()})),
            (
                QOS_REMEDIATION_AGENT,
                8002,
                "generate_remediation_plan",
                json!({"remediation_plan": {"plan_id": "PLAN-7", "device_id": "core-sw-1", "priority": 1, "actions": {"qos_policy": "voice-priority"}}}),
            ),
            (
                CONFIG_GENERATION_AGENT,
                8003,
                "generate_cli_config",
                json!({"cli_config": {"cli_text": "policy-map VOICE\n class voice\n  priority percent 30"}}),
            ),
            (
                CONFIG_VALIDATION_AGENT,
                8004,
                "validate_config",
                json!({"validation_result": {"is_valid": true, "report": "All checks passed."}}),
            ),
            (CONFIG_EXECUTION_AGENT, 8005, "execute_config", execution),
        ];
        for (name, port, capability, result) in agents {
            let agent = card(name, port, &[capability]);
            stub.succeed_with(&agent, result);
            directory.insert(agent).await;
        }
        let invoker = CapabilityInvoker::new("Orchestration Agent", directory.clone(), stub.clone());
        let pipeline = qos_pipeline(json!({"devices": ["core-sw-1"]}));
        (ChainExecutor::new(pipeline, directory, Arc::new(invoker)), stub)
    }

    #[tokio::test]
    async fn test_full_chain_reports_identifiers_and_artifact() {
        let (executor, stub) =
            wired(json!({"execution_status": {"status": "Success", "log": "applied"}})).await;

        let report = executor.run(json_map(json!({"trigger": "manual"}))).await;

        assert_eq!(report.outcome, Outcome::Success, "{}", report.message);
        assert_eq!(report.details["alarm_id"], json!("ALM-7"));
        assert_eq!(report.details["plan_id"], json!("PLAN-7"));
        assert_eq!(report.details["execution_status"], json!("Success"));
        assert!(report.details["deployed_config"].as_str().unwrap().contains("policy-map VOICE"));
        assert!(report.message.ends_with("Execution status: Success."), "{}", report.message);

        let calls = stub.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[1].payload.params["topology"], json!({"devices": ["core-sw-1"]}));
        assert_eq!(calls[1].payload.params["alarm_data"]["alarm_id"], json!("ALM-7"));
        assert_eq!(calls[2].payload.params["remediation_plan"]["plan_id"], json!("PLAN-7"));
        // validation and execution both receive the generated config
        assert_eq!(calls[3].payload.params, calls[4].payload.params);
    }

    #[tokio::test]
    async fn test_failed_deployment_is_reported_not_aborted() {
        for (status, log) in [("Failure", "device busy"), ("Rollback", "commit timed out")] {
            let (executor, _) =
                wired(json!({"execution_status": {"status": status, "log": log}})).await;

            let report = executor.run(JsonMap::new()).await;
            assert_eq!(report.outcome, Outcome::Success, "{}", report.message);
            assert_eq!(report.failed_stage, None);
            assert_eq!(report.completed_stages.len(), 5);
            assert_eq!(report.details["execution_status"], json!(status));
            assert_eq!(report.details["execution_log"], json!(log));
            assert!(
                report.message.ends_with(&format!("Execution status: {}.", status)),
                "{}",
                report.message
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_execution_status_is_malformed() {
        let (executor, _) =
            wired(json!({"execution_status": {"status": "Pending", "log": ""}})).await;

        let report = executor.run(JsonMap::new()).await;
        assert_eq!(report.failure_kind, Some(FailureKind::MalformedOutput));
        assert_eq!(report.failed_stage.as_deref(), Some("config_execution"));
    }

    #[tokio::test]
    async fn test_healthy_monitor_reading_is_malformed_output() {
        let stub = Arc::new(StubTransport::new());
        let directory = AgentDirectory::new();
        let monitor = card(QOS_MONITOR_AGENT, 8001, &["monitor_and_alarm"]);
        stub.succeed_with(&monitor, json!({"status": "Healthy"}));
        directory.insert(monitor).await;
        let invoker = CapabilityInvoker::new("Orchestration Agent", directory.clone(), stub.clone());
        let executor = ChainExecutor::new(qos_pipeline(json!({})), directory, Arc::new(invoker));

        let report = executor.run(JsonMap::new()).await;
        assert_eq!(report.failure_kind, Some(FailureKind::MalformedOutput));
        assert!(report.message.contains("missing field 'alarm_data'"));
        assert_eq!(stub.calls().len(), 1);
    }

    #[test]
    fn test_typed_rejects_wrong_shapes() {
        let output = json_map(json!({"validation_result": {"is_valid": "yes"}}));
        let err = typed::<ValidationResult>(&output, "validation_result").unwrap_err();
        assert!(err.starts_with("invalid field 'validation_result'"), "{}", err);
    }
}
