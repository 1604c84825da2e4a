use std::fmt;

/// Failures reported by a [`GatewayClient`](crate::gateway::GatewayClient) implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// An operation needing a selected device was called before selection.
    NotDiscovered,
    /// Discovery completed without finding any Internet Gateway Device.
    NoDevice,
    /// The device answered but refused the request.
    Rejected(String),
    /// The client has no way to perform this action on the device.
    Unsupported(&'static str),
    /// The request never reached the device or no answer came back.
    Transport(String),
    /// The device answered with something that could not be interpreted.
    InvalidResponse(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NotDiscovered => write!(f, "No gateway device selected"),
            GatewayError::NoDevice => write!(f, "No gateway device found"),
            GatewayError::Rejected(e) => write!(f, "Gateway rejected the request: {}", e),
            GatewayError::Unsupported(e) => write!(f, "Unsupported gateway action: {}", e),
            GatewayError::Transport(e) => write!(f, "Gateway transport error: {}", e),
            GatewayError::InvalidResponse(e) => write!(f, "Invalid gateway response: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Reasons a primitive invocation left its outputs at their default.
///
/// None of these are raised to the invoking flow; they are carried back in an
/// [`Outcome`](crate::primitives::Outcome) and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    NoDeviceSelected,
    DeviceOperationFailed {
        operation: &'static str,
        source: GatewayError,
    },
    MalformedBatchRequest(String),
    ArityMismatch {
        primitive: &'static str,
        expected: String,
        found: usize,
    },
    InvalidArgument {
        slot: String,
        reason: String,
    },
    UnknownPrimitive(String),
}

impl PrimitiveError {
    pub fn device(operation: &'static str, source: GatewayError) -> Self {
        PrimitiveError::DeviceOperationFailed { operation, source }
    }

    pub fn invalid<S: Into<String>, R: Into<String>>(slot: S, reason: R) -> Self {
        PrimitiveError::InvalidArgument {
            slot: slot.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveError::NoDeviceSelected => write!(f, "No UPnP device found"),
            PrimitiveError::DeviceOperationFailed { operation, source } => {
                write!(f, "Failed to {}: {}", operation, source)
            }
            PrimitiveError::MalformedBatchRequest(e) => write!(f, "Malformed batch request: {}", e),
            PrimitiveError::ArityMismatch {
                primitive,
                expected,
                found,
            } => write!(
                f,
                "Primitive `{}` expects {} arguments, got {}",
                primitive, expected, found
            ),
            PrimitiveError::InvalidArgument { slot, reason } => {
                write!(f, "Invalid argument `{}`: {}", slot, reason)
            }
            PrimitiveError::UnknownPrimitive(e) => write!(f, "Unknown primitive: {}", e),
        }
    }
}

impl std::error::Error for PrimitiveError {}

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlError(err.to_string())
    }
}

#[derive(Debug)]
pub enum FlowError {
    IoError(std::io::Error),
    TomlError(String),
    UnknownPrimitive(String),
    InvalidValue(String),
    ReportError(String),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::IoError(e) => write!(f, "IO error: {}", e),
            FlowError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            FlowError::UnknownPrimitive(e) => write!(f, "Unknown primitive in flow: {}", e),
            FlowError::InvalidValue(e) => write!(f, "Unsupported variable value: {}", e),
            FlowError::ReportError(e) => write!(f, "Report serialization error: {}", e),
        }
    }
}

impl std::error::Error for FlowError {}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::IoError(err)
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(err: toml::de::Error) -> Self {
        FlowError::TomlError(err.to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::ReportError(err.to_string())
    }
}
