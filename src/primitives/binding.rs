//! Input binding: resolves input slots through the execution context and coerces them to the
//! types the gateway calls need.

use log::trace;

use crate::context::{ExecutionContext, Value};
use crate::error_handling::types::PrimitiveError;
use crate::gateway::client::GatewayHandle;
use crate::gateway::types::Protocol;

/// Input values of one invocation, in slot order, resolved once before any device call.
#[derive(Debug, Clone)]
pub struct Inputs {
    names: Vec<String>,
    values: Vec<Value>,
}

impl Inputs {
    pub fn resolve<S: AsRef<str>>(ctx: &dyn ExecutionContext, names: &[S]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
        let values = names
            .iter()
            .map(|name| {
                let value = ctx.get_variable(name);
                trace!("bound {} = {:?}", name, value);
                value
            })
            .collect();
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from slot `from` to the end, for variable-length primitives.
    pub fn tail(&self, from: usize) -> &[Value] {
        self.values.get(from..).unwrap_or(&[])
    }

    fn slot(&self, index: usize) -> Result<(&str, &Value), PrimitiveError> {
        match (self.names.get(index), self.values.get(index)) {
            (Some(name), Some(value)) => Ok((name.as_str(), value)),
            _ => Err(PrimitiveError::invalid(
                format!("#{}", index),
                "missing input slot",
            )),
        }
    }

    pub fn value(&self, index: usize) -> Result<&Value, PrimitiveError> {
        self.slot(index).map(|(_, value)| value)
    }

    pub fn handle(&self, index: usize) -> Result<&GatewayHandle, PrimitiveError> {
        self.value(index)?
            .as_handle()
            .ok_or(PrimitiveError::NoDeviceSelected)
    }

    pub fn port(&self, index: usize) -> Result<u16, PrimitiveError> {
        let (name, value) = self.slot(index)?;
        port(name, value)
    }

    /// Port where 0 is accepted as the IGD:2 wildcard.
    pub fn port_or_any(&self, index: usize) -> Result<u16, PrimitiveError> {
        let (name, value) = self.slot(index)?;
        let n = integer(name, value)?;
        u16::try_from(n).map_err(|_| PrimitiveError::invalid(name, format!("{} is not a port", n)))
    }

    /// Lease time or duration in seconds.
    pub fn seconds(&self, index: usize) -> Result<u32, PrimitiveError> {
        let (name, value) = self.slot(index)?;
        let n = integer(name, value)?;
        u32::try_from(n)
            .map_err(|_| PrimitiveError::invalid(name, format!("{} is not a duration in seconds", n)))
    }

    pub fn text(&self, index: usize) -> Result<String, PrimitiveError> {
        let (name, value) = self.slot(index)?;
        match value {
            Value::Str(s) => Ok(s.clone()),
            Value::Int(i) => Ok(i.to_string()),
            other => Err(PrimitiveError::invalid(
                name,
                format!("expected a string, found {}", other.kind()),
            )),
        }
    }

    pub fn protocol(&self, index: usize) -> Result<Protocol, PrimitiveError> {
        let (name, value) = self.slot(index)?;
        protocol(name, value)
    }
}

/// Integer value, also accepting decimal strings.
pub fn integer(slot: &str, value: &Value) -> Result<i64, PrimitiveError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| PrimitiveError::invalid(slot, format!("`{}` is not an integer", s))),
        other => Err(PrimitiveError::invalid(
            slot,
            format!("expected an integer, found {}", other.kind()),
        )),
    }
}

/// Port number in 1..=65535.
pub fn port(slot: &str, value: &Value) -> Result<u16, PrimitiveError> {
    let n = integer(slot, value)?;
    match u16::try_from(n) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(PrimitiveError::invalid(slot, format!("{} is not a port", n))),
    }
}

pub fn protocol(slot: &str, value: &Value) -> Result<Protocol, PrimitiveError> {
    match value {
        Value::Str(s) => s.parse::<Protocol>().map_err(|e| PrimitiveError::invalid(slot, e)),
        other => Err(PrimitiveError::invalid(
            slot,
            format!("expected a protocol name, found {}", other.kind()),
        )),
    }
}
