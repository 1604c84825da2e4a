pub mod types;

pub use types::{ConfigError, FlowError, GatewayError, PrimitiveError};
