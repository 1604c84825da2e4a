//! Execution context seen by primitives: typed values and named-variable access.

pub mod store;
pub mod value;

pub use store::{ExecutionContext, VariableStore};
pub use value::Value;
