//! Flow files and the runner behind the `igd-primitives` binary.
//!
//! A flow is a list of primitive invocations sharing one variable store, read from TOML. It stands
//! in for the external state machine that normally drives the primitives, which makes it handy for
//! lab checks against a real router or dry runs with `--simulate`.

pub mod runner;
pub mod types;

pub use runner::FlowRunner;
pub use types::{Flow, FlowFile, FlowReport, Step, StepDefinition, StepReport};
