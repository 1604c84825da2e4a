use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// SSDP discovery parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// How long to wait for gateways to answer, in milliseconds
    pub delay_ms: u64,
    /// Local address to send the search from; any interface when unset
    pub bind_address: Option<IpAddr>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            delay_ms: 200,
            bind_address: None,
        }
    }
}

/// Descriptions sent along with mapping requests.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub description: String,
    pub any_description: String,
    pub bulk_description: String,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            description: "igd-primitives mapping".to_string(),
            any_description: "igd-primitives any mapping".to_string(),
            bulk_description: "igd-primitives bulk mapping".to_string(),
        }
    }
}
