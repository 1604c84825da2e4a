//! Gateway Client trait
//!
//! This module defines the `GatewayClient` trait, the interface to one Internet Gateway Device
//! reachable over the network, and `GatewayHandle`, the shareable reference to a selected device
//! that primitives pass around through named variables.
//!
//! Implementors of this trait are responsible for:
//! - Discovering devices and selecting one to talk to
//! - Translating each call into the matching IGD (v1 or IGD:2) action
//! - Reporting transport failures and device refusals as `GatewayError`
//!
//! Only `discover` and `select_device` need exclusive access; every other call takes `&self` so a
//! selected client can sit behind an `Arc` inside a `GatewayHandle`.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::error_handling::types::GatewayError;
use crate::gateway::types::{ConnectionStatus, FirewallStatus, PinholeRequest, PortMapping, Protocol};

/// The `GatewayClient` trait defines the interface to a single Internet Gateway Device.
///
/// Boolean results are the device's acknowledgment; `Ok(false)` means the device answered but did
/// not confirm the action.
pub trait GatewayClient: Send + Sync {
    /// Searches the local network and returns the number of devices found.
    fn discover(&mut self) -> Result<usize, GatewayError>;

    /// Selects the first valid IGD among the discovered devices.
    fn select_device(&mut self) -> Result<(), GatewayError>;

    /// Local address of this host on the gateway's LAN.
    fn lan_address(&self) -> Result<String, GatewayError>;

    /// WAN address of the gateway.
    fn external_ip(&self) -> Result<String, GatewayError>;

    /// Adds a permanent mapping `external_port` -> `internal_ip:internal_port`.
    ///
    /// - `remote_host` - Remote host restriction; empty for any host.
    fn add_mapping(
        &self,
        external_port: u16,
        protocol: Protocol,
        internal_ip: &str,
        internal_port: u16,
        description: &str,
        remote_host: &str,
    ) -> Result<bool, GatewayError>;

    fn delete_mapping(&self, external_port: u16, protocol: Protocol) -> Result<bool, GatewayError>;

    /// Adds a mapping letting the device pick another external port when `suggested_port` is
    /// taken, and returns the port actually assigned.
    #[allow(clippy::too_many_arguments)]
    fn add_any_mapping(
        &self,
        suggested_port: u16,
        protocol: Protocol,
        internal_ip: &str,
        internal_port: u16,
        description: &str,
        remote_host: &str,
        lease_duration: u32,
    ) -> Result<u16, GatewayError>;

    fn status(&self) -> Result<ConnectionStatus, GatewayError>;

    /// Returns the mapping stored at `index`, or `None` past the end of the table.
    fn enumerate_mapping(&self, index: u32) -> Result<Option<PortMapping>, GatewayError>;

    /// Creates an IGD:2 pinhole and returns its unique id.
    fn add_pinhole(&self, request: &PinholeRequest, lease_time: u32) -> Result<String, GatewayError>;

    fn update_pinhole(&self, unique_id: &str, lease_time: u32) -> Result<bool, GatewayError>;

    fn check_pinhole(&self, unique_id: &str) -> Result<bool, GatewayError>;

    fn pinhole_packet_count(&self, unique_id: &str) -> Result<u64, GatewayError>;

    fn delete_pinhole(&self, unique_id: &str) -> Result<bool, GatewayError>;

    /// IGD:2 `GetListOfPortMappings`: up to `count` mappings starting at `start_index`.
    fn list_mappings(&self, start_index: u32, count: u32) -> Result<Vec<PortMapping>, GatewayError>;

    fn firewall_status(&self) -> Result<FirewallStatus, GatewayError>;

    fn outbound_pinhole_timeout(&self, request: &PinholeRequest) -> Result<u32, GatewayError>;

    /// Base URL of the selected device, if it advertises one.
    fn presentation_base_url(&self) -> Result<Option<String>, GatewayError>;
}

/// Process-local reference to a discovered and selected gateway.
///
/// Cloning is cheap and every clone talks to the same device; the id survives serialization so
/// flows can tell handles apart in reports.
#[derive(Clone)]
pub struct GatewayHandle {
    id: Uuid,
    client: Arc<dyn GatewayClient>,
}

impl GatewayHandle {
    pub fn new(client: Box<dyn GatewayClient>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client: Arc::from(client),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client(&self) -> &dyn GatewayClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for GatewayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayHandle").field("id", &self.id).finish()
    }
}

impl PartialEq for GatewayHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
