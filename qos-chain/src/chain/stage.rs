//! Pipeline stage definitions.
//!
//! A stage is data: which capability on which agent, how its parameters are
//! assembled from earlier outputs, and how its result is checked. Reordering or
//! replacing stages never touches the executor.

use crate::types::JsonMap;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

pub type ParamBuilder = Arc<dyn Fn(&ChainContext) -> Result<JsonMap, String> + Send + Sync>;
pub type OutputParser = Arc<dyn Fn(JsonMap) -> Result<StageOutput, String> + Send + Sync>;

/// Values available to a stage when its parameters are built.
#[derive(Debug, Clone, Default)]
pub struct ChainContext {
    trigger: JsonMap,
    carried: JsonMap,
    previous: Option<JsonMap>,
}

impl ChainContext {
    pub fn new(trigger: JsonMap) -> Self {
        Self {
            trigger,
            carried: JsonMap::new(),
            previous: None,
        }
    }

    /// The seed payload the run was started with.
    pub fn trigger(&self) -> &JsonMap {
        &self.trigger
    }

    /// Everything carried forward so far; later stages overwrite earlier keys.
    pub fn carried(&self) -> &JsonMap {
        &self.carried
    }

    /// What the most recent stage carried forward, if any stage ran.
    pub fn previous(&self) -> Option<&JsonMap> {
        self.previous.as_ref()
    }

    /// Look a value up in carried outputs, falling back to the trigger.
    pub fn lookup(&self, key: &str) -> Option<&JsonValue> {
        self.carried.get(key).or_else(|| self.trigger.get(key))
    }

    pub(crate) fn advance(&mut self, carry: JsonMap) {
        for (key, value) in &carry {
            self.carried.insert(key.clone(), value.clone());
        }
        self.previous = Some(carry);
    }
}

/// One named input of a [`ParamSource::Fields`] stage.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldBinding {
    /// `name` takes the value carried (or triggered) under `from`.
    Carried { name: String, from: String },
    Constant { name: String, value: JsonValue },
}

impl FieldBinding {
    pub fn carried(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::Carried {
            from: name.clone(),
            name,
        }
    }

    pub fn renamed(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self::Carried {
            name: name.into(),
            from: from.into(),
        }
    }

    pub fn constant(name: impl Into<String>, value: JsonValue) -> Self {
        Self::Constant {
            name: name.into(),
            value,
        }
    }
}

/// How a stage's call parameters are assembled.
#[derive(Clone)]
pub enum ParamSource {
    /// The run's trigger, unchanged.
    Trigger,
    /// What the previous stage carried forward; the trigger for the first stage.
    Previous,
    Fields(Vec<FieldBinding>),
    Custom(ParamBuilder),
}

impl ParamSource {
    pub fn build(&self, ctx: &ChainContext) -> Result<JsonMap, String> {
        match self {
            ParamSource::Trigger => Ok(ctx.trigger().clone()),
            ParamSource::Previous => Ok(ctx.previous().unwrap_or(ctx.trigger()).clone()),
            ParamSource::Fields(bindings) => {
                let mut params = JsonMap::new();
                for binding in bindings {
                    match binding {
                        FieldBinding::Carried { name, from } => {
                            let value = ctx
                                .lookup(from)
                                .ok_or_else(|| format!("missing input '{}'", from))?;
                            params.insert(name.clone(), value.clone());
                        }
                        FieldBinding::Constant { name, value } => {
                            params.insert(name.clone(), value.clone());
                        }
                    }
                }
                Ok(params)
            }
            ParamSource::Custom(builder) => builder(ctx),
        }
    }
}

impl fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Trigger => write!(f, "Trigger"),
            ParamSource::Previous => write!(f, "Previous"),
            ParamSource::Fields(bindings) => f.debug_tuple("Fields").field(bindings).finish(),
            ParamSource::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Result of checking one stage's output.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// Continue; `carry` feeds later stages, `details` goes into the final report.
    Accepted { carry: JsonMap, details: JsonMap },
    /// The stage ran but refuses to let the chain continue.
    Rejected(String),
}

impl StageOutput {
    /// Carry the whole output forward and report all of it.
    pub fn accepted(output: JsonMap) -> Self {
        StageOutput::Accepted {
            carry: output.clone(),
            details: output,
        }
    }
}

/// How a stage's result payload is checked.
#[derive(Clone)]
pub enum OutputSpec {
    Passthrough,
    /// Every listed key must be present.
    Require(Vec<String>),
    Custom(OutputParser),
}

impl OutputSpec {
    pub fn parse(&self, output: JsonMap) -> Result<StageOutput, String> {
        match self {
            OutputSpec::Passthrough => Ok(StageOutput::accepted(output)),
            OutputSpec::Require(keys) => {
                if let Some(missing) = keys.iter().find(|k| !output.contains_key(k.as_str())) {
                    return Err(format!("missing field '{}'", missing));
                }
                Ok(StageOutput::accepted(output))
            }
            OutputSpec::Custom(parser) => parser(output),
        }
    }
}

impl fmt::Debug for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSpec::Passthrough => write!(f, "Passthrough"),
            OutputSpec::Require(keys) => f.debug_tuple("Require").field(keys).finish(),
            OutputSpec::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// One step of a chain: call `capability` on `service`.
#[derive(Debug, Clone)]
pub struct PipelineStage {
    pub name: String,
    pub service: String,
    pub capability: String,
    pub params: ParamSource,
    pub output: OutputSpec,
}

impl PipelineStage {
    pub fn new(
        name: impl Into<String>,
        service: impl Into<String>,
        capability: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            service: service.into(),
            capability: capability.into(),
            params: ParamSource::Previous,
            output: OutputSpec::Passthrough,
        }
    }

    pub fn with_params(mut self, params: ParamSource) -> Self {
        self.params = params;
        self
    }

    pub fn with_param_builder<F>(self, builder: F) -> Self
    where
        F: Fn(&ChainContext) -> Result<JsonMap, String> + Send + Sync + 'static,
    {
        self.with_params(ParamSource::Custom(Arc::new(builder)))
    }

    pub fn with_output(mut self, output: OutputSpec) -> Self {
        self.output = output;
        self
    }

    pub fn with_output_parser<F>(self, parser: F) -> Self
    where
        F: Fn(JsonMap) -> Result<StageOutput, String> + Send + Sync + 'static,
    {
        self.with_output(OutputSpec::Custom(Arc::new(parser)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::json_map;
    use serde_json::json;

    #[test]
    fn test_previous_falls_back_to_trigger() {
        let mut ctx = ChainContext::new(json_map(json!({"seed": true})));
        assert_eq!(ParamSource::Previous.build(&ctx).unwrap(), json_map(json!({"seed": true})));

        ctx.advance(json_map(json!({"x": 1})));
        assert_eq!(ParamSource::Previous.build(&ctx).unwrap(), json_map(json!({"x": 1})));
        assert_eq!(ParamSource::Trigger.build(&ctx).unwrap(), json_map(json!({"seed": true})));
    }

    #[test]
    fn test_fields_pick_carried_values_and_constants() {
        let mut ctx = ChainContext::new(json_map(json!({"region": "eu"})));
        ctx.advance(json_map(json!({"alarm_data": {"alarm_id": "A1"}})));
        ctx.advance(json_map(json!({"plan": {"plan_id": "P1"}})));

        let source = ParamSource::Fields(vec![
            FieldBinding::carried("alarm_data"),
            FieldBinding::renamed("remediation_plan", "plan"),
            FieldBinding::carried("region"),
            FieldBinding::constant("dry_run", json!(false)),
        ]);
        assert_eq!(
            source.build(&ctx).unwrap(),
            json_map(json!({
                "alarm_data": {"alarm_id": "A1"},
                "remediation_plan": {"plan_id": "P1"},
                "region": "eu",
                "dry_run": false
            }))
        );

        let missing = ParamSource::Fields(vec![FieldBinding::carried("cli_config")]);
        assert_eq!(missing.build(&ctx).unwrap_err(), "missing input 'cli_config'");
    }

    #[test]
    fn test_require_reports_first_missing_field() {
        let spec = OutputSpec::Require(vec!["y".to_string(), "z".to_string()]);
        assert_eq!(spec.parse(json_map(json!({"y": 2}))).unwrap_err(), "missing field 'z'");
        assert_eq!(
            spec.parse(json_map(json!({"y": 2, "z": 3}))).unwrap(),
            StageOutput::accepted(json_map(json!({"y": 2, "z": 3})))
        );
    }
}
