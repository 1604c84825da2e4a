//! Execution Context trait
//!
//! The host state machine owns every variable; primitives only see it through
//! `ExecutionContext`. `VariableStore` is the in-memory implementation used by the flow runner and
//! tests.

use std::collections::BTreeMap;

use log::trace;
use serde::Serialize;

use super::value::Value;

/// Named-variable access offered by the host engine.
pub trait ExecutionContext {
    /// Current value of `name`; [`Value::Unset`] when the variable does not exist.
    fn get_variable(&self, name: &str) -> Value;

    fn set_variable(&mut self, name: &str, value: Value);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableStore {
    variables: BTreeMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variables.iter()
    }
}

impl ExecutionContext for VariableStore {
    fn get_variable(&self, name: &str) -> Value {
        self.variables.get(name).cloned().unwrap_or_default()
    }

    fn set_variable(&mut self, name: &str, value: Value) {
        trace!("{} <- {:?}", name, value);
        self.variables.insert(name.to_string(), value);
    }
}
