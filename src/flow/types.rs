use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::{Value, VariableStore};
use crate::error_handling::types::FlowError;
use crate::primitives::Primitive;

/// Flow file as written on disk.
///
/// ```toml
/// [variables]
/// web_port = 8080
/// proto = "TCP"
///
/// [[steps]]
/// primitive = "discover"
/// outputs = ["gw", "lan", "ext"]
///
/// [[steps]]
/// primitive = "add_port_mapping"
/// inputs = ["gw", "lan", "ext", "web_port", "web_port", "proto"]
/// outputs = ["mapped_ip", "mapped_port"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowFile {
    #[serde(default)]
    pub variables: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub primitive: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// One step with its primitive already looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub primitive: Primitive,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// A validated flow: initial variables plus the steps to run in order.
#[derive(Debug, Clone)]
pub struct Flow {
    pub variables: VariableStore,
    pub steps: Vec<Step>,
}

impl Flow {
    /// Reads and validates a flow file.
    ///
    /// # Errors
    /// - `FlowError::IoError` if the file cannot be read
    /// - `FlowError::TomlError` if it is not a valid flow document
    /// - `FlowError::UnknownPrimitive` if a step names no known primitive
    /// - `FlowError::InvalidValue` for initial values other than integers, strings and booleans
    pub fn from_file(path: &Path) -> Result<Flow, FlowError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Flow, FlowError> {
        let file: FlowFile = toml::from_str(content)?;
        Self::try_from(file)
    }
}

impl TryFrom<FlowFile> for Flow {
    type Error = FlowError;

    fn try_from(file: FlowFile) -> Result<Self, Self::Error> {
        let mut variables = VariableStore::new();
        for (name, raw) in file.variables {
            let value = initial_value(&name, raw)?;
            variables = variables.with(&name, value);
        }

        let steps = file
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                let primitive = step.primitive.parse::<Primitive>().map_err(|_| {
                    FlowError::UnknownPrimitive(format!("step {}: `{}`", index, step.primitive))
                })?;
                Ok(Step {
                    primitive,
                    inputs: step.inputs,
                    outputs: step.outputs,
                })
            })
            .collect::<Result<Vec<_>, FlowError>>()?;

        Ok(Flow { variables, steps })
    }
}

fn initial_value(name: &str, raw: toml::Value) -> Result<Value, FlowError> {
    match raw {
        toml::Value::Integer(i) => Ok(Value::Int(i)),
        toml::Value::String(s) => Ok(Value::Str(s)),
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        other => Err(FlowError::InvalidValue(format!(
            "`{}` is a {}",
            name,
            other.type_str()
        ))),
    }
}

/// What happened to one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub primitive: String,
    pub started_at: DateTime<Utc>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole run, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
    pub variables: VariableStore,
}

impl FlowReport {
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| !s.completed).count()
    }

    pub fn to_json(&self) -> Result<String, FlowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
