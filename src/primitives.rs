//! UPnP IGD action primitives for a state-machine host.
//!
//! A primitive reads named input variables, performs one IGD operation and writes named output
//! variables. It never fails the flow that invoked it: on any failure its outputs are left
//! [`Unset`](crate::context::Value::Unset) and a diagnostic is logged.
//!
//! Re-exports:
//! - [`Dispatcher`]: entry point binding variables and running primitives.
//! - [`Primitive`], [`Signature`], [`Arity`]: the registry of operations.
//! - [`Outcome`]: informational result of an invocation.
//!
//! Example:
//! ```
//! use igd_primitives::configuration::MappingConfig;
//! use igd_primitives::context::{Value, VariableStore};
//! use igd_primitives::gateway::SimulatedGateway;
//! use igd_primitives::primitives::{Dispatcher, Primitive};
//!
//! let dispatcher = Dispatcher::simulated(SimulatedGateway::new(), MappingConfig::default());
//! let mut vars = VariableStore::new();
//! dispatcher.invoke(Primitive::Discover, &[] as &[&str], &["gw", "lan", "ext"], &mut vars);
//! assert!(vars.get("gw").and_then(Value::as_handle).is_some());
//! ```

pub mod batch;
pub mod binding;
pub mod dispatcher;
mod operations;
pub mod signature;
#[cfg(test)]
mod tests;

pub use batch::{MappingResult, MappingTriple, Token};
pub use dispatcher::{Dispatcher, GatewayFactory, Outcome};
pub use signature::{Arity, Primitive, Signature};
