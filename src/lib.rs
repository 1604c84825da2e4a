pub mod configuration;
pub use configuration::*;

pub mod context;
pub use context::*;

pub mod error_handling;

pub mod flow;

pub mod gateway;

pub mod primitives;
pub use primitives::{Dispatcher, Outcome, Primitive};
