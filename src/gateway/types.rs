//! Plain data exchanged with an Internet Gateway Device.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport protocol of a port mapping or pinhole.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Protocol {
    TCP,
    UDP,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::TCP => "TCP",
            Protocol::UDP => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TCP" => Ok(Protocol::TCP),
            "UDP" => Ok(Protocol::UDP),
            other => Err(format!("unknown protocol `{}`", other)),
        }
    }
}

/// One entry of the gateway's port mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub external_port: u16,
    pub protocol: Protocol,
    pub internal_ip: String,
    pub internal_port: u16,
    pub description: String,
    /// Seconds; 0 means permanent.
    pub lease_duration: u32,
    pub enabled: bool,
    /// Empty when the mapping accepts any remote host.
    pub remote_host: String,
}

/// Parameters identifying an IGD:2 firewall pinhole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinholeRequest {
    pub remote_ip: String,
    pub remote_port: u16,
    pub internal_ip: String,
    pub internal_port: u16,
    pub protocol: Protocol,
}

/// Snapshot of the WAN connection as reported by `GetStatusInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: String,
    pub uptime: u64,
    pub last_connection_error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallStatus {
    pub firewall_enabled: bool,
    pub inbound_pinhole_allowed: bool,
}
