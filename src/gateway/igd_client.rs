//! `GatewayClient` backed by the `igd-next` crate.
//!
//! Covers the IGD v1 WANIPConnection actions `igd-next` exposes. Status queries, IGD:2 pinholes,
//! the firewall control service and `GetListOfPortMappings` are answered with
//! `GatewayError::Unsupported`. The presentation URL is the base of the device description
//! location the gateway advertised over SSDP.

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;

use igd_next::{
    search_gateway, Gateway, GetGenericPortMappingEntryError, PortMappingProtocol, SearchError,
    SearchOptions,
};
use log::{debug, info};

use crate::configuration::types::DiscoveryConfig;
use crate::error_handling::types::GatewayError;
use crate::gateway::client::GatewayClient;
use crate::gateway::types::{ConnectionStatus, FirewallStatus, PinholeRequest, PortMapping, Protocol};

pub struct IgdClient {
    discovery: DiscoveryConfig,
    found: Option<Gateway>,
    selected: Option<Gateway>,
}

impl IgdClient {
    pub fn new(discovery: DiscoveryConfig) -> Self {
        Self {
            discovery,
            found: None,
            selected: None,
        }
    }

    fn gateway(&self) -> Result<&Gateway, GatewayError> {
        self.selected.as_ref().ok_or(GatewayError::NotDiscovered)
    }
}

impl From<Protocol> for PortMappingProtocol {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::TCP => PortMappingProtocol::TCP,
            Protocol::UDP => PortMappingProtocol::UDP,
        }
    }
}

impl From<PortMappingProtocol> for Protocol {
    fn from(protocol: PortMappingProtocol) -> Self {
        match protocol {
            PortMappingProtocol::TCP => Protocol::TCP,
            PortMappingProtocol::UDP => Protocol::UDP,
        }
    }
}

/// Base URL of the device description, i.e. its location up to the last `/`.
fn description_base(addr: SocketAddr, root_url: &str) -> String {
    let location = if root_url.starts_with("http://") || root_url.starts_with("https://") {
        root_url.to_string()
    } else if root_url.starts_with('/') {
        format!("http://{}{}", addr, root_url)
    } else {
        format!("http://{}/{}", addr, root_url)
    };
    let scheme_end = location.find("://").map_or(0, |i| i + 3);
    match location[scheme_end..].rfind('/') {
        Some(i) => location[..scheme_end + i + 1].to_string(),
        None => format!("{}/", location),
    }
}

fn local_socket(internal_ip: &str, internal_port: u16) -> Result<SocketAddr, GatewayError> {
    let ip: IpAddr = internal_ip
        .parse()
        .map_err(|_| GatewayError::Rejected(format!("`{}` is not an IP address", internal_ip)))?;
    Ok(SocketAddr::new(ip, internal_port))
}

impl GatewayClient for IgdClient {
    fn discover(&mut self) -> Result<usize, GatewayError> {
        let defaults = SearchOptions::default();
        let options = SearchOptions {
            timeout: Some(Duration::from_millis(self.discovery.delay_ms)),
            bind_addr: self
                .discovery
                .bind_address
                .map_or(defaults.bind_addr, |ip| SocketAddr::new(ip, 0)),
            ..defaults
        };

        match search_gateway(options) {
            Ok(gateway) => {
                debug!("Gateway answered from {}", gateway.addr);
                self.found = Some(gateway);
                Ok(1)
            }
            Err(SearchError::NoResponseWithinTimeout) => {
                self.found = None;
                Ok(0)
            }
            Err(e) => Err(GatewayError::Transport(e.to_string())),
        }
    }

    fn select_device(&mut self) -> Result<(), GatewayError> {
        let gateway = self.found.clone().ok_or(GatewayError::NoDevice)?;
        info!("Selected gateway at {}", gateway.addr);
        self.selected = Some(gateway);
        Ok(())
    }

    fn lan_address(&self) -> Result<String, GatewayError> {
        let gateway = self.gateway()?;
        // Routing table lookup only; connect() on UDP sends nothing.
        let socket =
            UdpSocket::bind("0.0.0.0:0").map_err(|e| GatewayError::Transport(e.to_string()))?;
        socket
            .connect(gateway.addr)
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let local = socket
            .local_addr()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(local.ip().to_string())
    }

    fn external_ip(&self) -> Result<String, GatewayError> {
        self.gateway()?
            .get_external_ip()
            .map(|ip| ip.to_string())
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }

    fn add_mapping(
        &self,
        external_port: u16,
        protocol: Protocol,
        internal_ip: &str,
        internal_port: u16,
        description: &str,
        remote_host: &str,
    ) -> Result<bool, GatewayError> {
        let gateway = self.gateway()?;
        if !remote_host.is_empty() {
            return Err(GatewayError::Unsupported("AddPortMapping with a remote host"));
        }
        let local = local_socket(internal_ip, internal_port)?;
        match gateway.add_port(protocol.into(), external_port, local, 0, description) {
            Ok(()) => Ok(true),
            Err(e) => Err(GatewayError::Rejected(e.to_string())),
        }
    }

    fn delete_mapping(&self, external_port: u16, protocol: Protocol) -> Result<bool, GatewayError> {
        match self.gateway()?.remove_port(protocol.into(), external_port) {
            Ok(()) => Ok(true),
            Err(e) => Err(GatewayError::Rejected(e.to_string())),
        }
    }

    fn add_any_mapping(
        &self,
        suggested_port: u16,
        protocol: Protocol,
        internal_ip: &str,
        internal_port: u16,
        description: &str,
        remote_host: &str,
        lease_duration: u32,
    ) -> Result<u16, GatewayError> {
        let gateway = self.gateway()?;
        if !remote_host.is_empty() {
            return Err(GatewayError::Unsupported("AddAnyPortMapping with a remote host"));
        }
        let local = local_socket(internal_ip, internal_port)?;
        if gateway
            .add_port(protocol.into(), suggested_port, local, lease_duration, description)
            .is_ok()
        {
            return Ok(suggested_port);
        }
        debug!(
            "Suggested port {}/{} refused, letting the gateway choose",
            suggested_port, protocol
        );
        gateway
            .add_any_port(protocol.into(), local, lease_duration, description)
            .map_err(|e| GatewayError::Rejected(e.to_string()))
    }

    fn status(&self) -> Result<ConnectionStatus, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("GetStatusInfo"))
    }

    fn enumerate_mapping(&self, index: u32) -> Result<Option<PortMapping>, GatewayError> {
        let entry = match self.gateway()?.get_generic_port_mapping_entry(index) {
            Ok(entry) => entry,
            Err(GetGenericPortMappingEntryError::SpecifiedArrayIndexInvalid) => return Ok(None),
            Err(e) => return Err(GatewayError::Rejected(e.to_string())),
        };
        Ok(Some(PortMapping {
            external_port: entry.external_port,
            protocol: entry.protocol.into(),
            internal_ip: entry.internal_client,
            internal_port: entry.internal_port,
            description: entry.port_mapping_description,
            lease_duration: entry.lease_duration,
            enabled: entry.enabled,
            remote_host: entry.remote_host,
        }))
    }

    fn add_pinhole(&self, _request: &PinholeRequest, _lease_time: u32) -> Result<String, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("AddPinhole"))
    }

    fn update_pinhole(&self, _unique_id: &str, _lease_time: u32) -> Result<bool, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("UpdatePinhole"))
    }

    fn check_pinhole(&self, _unique_id: &str) -> Result<bool, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("CheckPinholeWorking"))
    }

    fn pinhole_packet_count(&self, _unique_id: &str) -> Result<u64, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("GetPinholePackets"))
    }

    fn delete_pinhole(&self, _unique_id: &str) -> Result<bool, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("DeletePinhole"))
    }

    fn list_mappings(&self, _start_index: u32, _count: u32) -> Result<Vec<PortMapping>, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("GetListOfPortMappings"))
    }

    fn firewall_status(&self) -> Result<FirewallStatus, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("GetFirewallStatus"))
    }

    fn outbound_pinhole_timeout(&self, _request: &PinholeRequest) -> Result<u32, GatewayError> {
        self.gateway()?;
        Err(GatewayError::Unsupported("GetOutboundPinholeTimeout"))
    }

    fn presentation_base_url(&self) -> Result<Option<String>, GatewayError> {
        let gateway = self.gateway()?;
        Ok(Some(description_base(gateway.addr, &gateway.root_url)))
    }
}
