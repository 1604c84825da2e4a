//! In-memory gateway used by tests, demos and `--simulate` runs.
//!
//! `SimulatedGateway` keeps a mapping table and a pinhole table behind a shared lock. Clones share
//! that state, so a test can hand one clone to the code under test and inspect the other
//! afterwards.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::trace;

use crate::error_handling::types::GatewayError;
use crate::gateway::client::GatewayClient;
use crate::gateway::types::{ConnectionStatus, FirewallStatus, PinholeRequest, PortMapping, Protocol};

#[derive(Debug)]
struct Pinhole {
    request: PinholeRequest,
    lease_time: u32,
    packets: u64,
}

#[derive(Debug)]
struct SimState {
    devices: usize,
    discovered: bool,
    selected: bool,
    igd2: bool,
    lan_address: String,
    external_ip: String,
    base_url: Option<String>,
    mappings: Vec<PortMapping>,
    rejected: HashSet<(u16, Protocol)>,
    failing: HashSet<(u16, Protocol)>,
    enumeration_fails_at: Option<u32>,
    pinholes: BTreeMap<String, Pinhole>,
    next_pinhole_id: u64,
    outbound_timeout: u32,
    calls: usize,
}

#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedGateway {
    /// One IGD:2 capable device on `192.168.1.0/24` with an empty mapping table.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                devices: 1,
                discovered: false,
                selected: false,
                igd2: true,
                lan_address: "192.168.1.10".to_string(),
                external_ip: "203.0.113.7".to_string(),
                base_url: Some("http://192.168.1.1:5000/".to_string()),
                mappings: Vec::new(),
                rejected: HashSet::new(),
                failing: HashSet::new(),
                enumeration_fails_at: None,
                pinholes: BTreeMap::new(),
                next_pinhole_id: 1,
                outbound_timeout: 120,
                calls: 0,
            })),
        }
    }

    pub fn with_devices(self, devices: usize) -> Self {
        self.state().devices = devices;
        self
    }

    pub fn with_external_ip(self, ip: &str) -> Self {
        self.state().external_ip = ip.to_string();
        self
    }

    pub fn with_base_url(self, url: Option<&str>) -> Self {
        self.state().base_url = url.map(str::to_string);
        self
    }

    /// Makes every IGD:2 action fail as unsupported.
    pub fn igd1_only(self) -> Self {
        self.state().igd2 = false;
        self
    }

    pub fn with_mapping(self, mapping: PortMapping) -> Self {
        self.state().mappings.push(mapping);
        self
    }

    /// The device answers `false` to add/delete requests for this port.
    pub fn reject_port(self, port: u16, protocol: Protocol) -> Self {
        self.state().rejected.insert((port, protocol));
        self
    }

    /// Requests for this port fail at the transport level.
    pub fn fail_port(self, port: u16, protocol: Protocol) -> Self {
        self.state().failing.insert((port, protocol));
        self
    }

    pub fn fail_enumeration_at(self, index: u32) -> Self {
        self.state().enumeration_fails_at = Some(index);
        self
    }

    pub fn with_outbound_timeout(self, seconds: u32) -> Self {
        self.state().outbound_timeout = seconds;
        self
    }

    /// Marks the device as already discovered and selected.
    pub fn selected(self) -> Self {
        {
            let mut state = self.state();
            state.discovered = true;
            state.selected = true;
        }
        self
    }

    /// Number of device calls received so far.
    pub fn calls(&self) -> usize {
        self.state().calls
    }

    pub fn mappings(&self) -> Vec<PortMapping> {
        self.state().mappings.clone()
    }

    pub fn pinhole_ids(&self) -> Vec<String> {
        self.state().pinholes.keys().cloned().collect()
    }

    pub fn pinhole_lease(&self, unique_id: &str) -> Option<u32> {
        self.state().pinholes.get(unique_id).map(|p| p.lease_time)
    }

    pub fn record_packets(&self, unique_id: &str, packets: u64) {
        if let Some(pinhole) = self.state().pinholes.get_mut(unique_id) {
            pinhole.packets += packets;
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts the call and checks that a device is selected.
    fn enter(&self, action: &str) -> Result<MutexGuard<'_, SimState>, GatewayError> {
        let mut state = self.state();
        state.calls += 1;
        trace!("simulated gateway: {}", action);
        if !state.selected {
            return Err(GatewayError::NotDiscovered);
        }
        Ok(state)
    }

    fn enter_igd2(&self, action: &'static str) -> Result<MutexGuard<'_, SimState>, GatewayError> {
        let state = self.enter(action)?;
        if !state.igd2 {
            return Err(GatewayError::Unsupported(action));
        }
        Ok(state)
    }
}

impl SimState {
    fn check_port(&self, port: u16, protocol: Protocol) -> Result<bool, GatewayError> {
        if self.failing.contains(&(port, protocol)) {
            return Err(GatewayError::Transport(format!(
                "no answer for {}/{}",
                port, protocol
            )));
        }
        Ok(!self.rejected.contains(&(port, protocol)))
    }

    fn port_taken(&self, port: u16, protocol: Protocol) -> bool {
        self.mappings
            .iter()
            .any(|m| m.external_port == port && m.protocol == protocol)
    }

    fn insert_mapping(&mut self, mapping: PortMapping) {
        self.mappings
            .retain(|m| !(m.external_port == mapping.external_port && m.protocol == mapping.protocol));
        self.mappings.push(mapping);
    }

    fn pinhole(&mut self, unique_id: &str) -> Result<&mut Pinhole, GatewayError> {
        self.pinholes
            .get_mut(unique_id)
            .ok_or_else(|| GatewayError::Rejected(format!("no such pinhole `{}`", unique_id)))
    }
}

impl GatewayClient for SimulatedGateway {
    fn discover(&mut self) -> Result<usize, GatewayError> {
        let mut state = self.state();
        state.calls += 1;
        state.discovered = true;
        Ok(state.devices)
    }

    fn select_device(&mut self) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.calls += 1;
        if !state.discovered {
            return Err(GatewayError::NotDiscovered);
        }
        if state.devices == 0 {
            return Err(GatewayError::NoDevice);
        }
        state.selected = true;
        Ok(())
    }

    fn lan_address(&self) -> Result<String, GatewayError> {
        Ok(self.enter("lan_address")?.lan_address.clone())
    }

    fn external_ip(&self) -> Result<String, GatewayError> {
        Ok(self.enter("external_ip")?.external_ip.clone())
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
        let mut state = self.enter("add_mapping")?;
        if !state.check_port(external_port, protocol)? {
            return Ok(false);
        }
        state.insert_mapping(PortMapping {
            external_port,
            protocol,
            internal_ip: internal_ip.to_string(),
            internal_port,
            description: description.to_string(),
            lease_duration: 0,
            enabled: true,
            remote_host: remote_host.to_string(),
        });
        Ok(true)
    }

    fn delete_mapping(&self, external_port: u16, protocol: Protocol) -> Result<bool, GatewayError> {
        let mut state = self.enter("delete_mapping")?;
        if !state.check_port(external_port, protocol)? || !state.port_taken(external_port, protocol) {
            return Ok(false);
        }
        state
            .mappings
            .retain(|m| !(m.external_port == external_port && m.protocol == protocol));
        Ok(true)
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
        let mut state = self.enter("add_any_mapping")?;
        let mut port = suggested_port;
        for _ in 0..=u16::MAX {
            if port != 0 && !state.port_taken(port, protocol) && state.check_port(port, protocol)? {
                state.insert_mapping(PortMapping {
                    external_port: port,
                    protocol,
                    internal_ip: internal_ip.to_string(),
                    internal_port,
                    description: description.to_string(),
                    lease_duration,
                    enabled: true,
                    remote_host: remote_host.to_string(),
                });
                return Ok(port);
            }
            port = port.wrapping_add(1);
        }
        Err(GatewayError::Rejected("no free external port".to_string()))
    }

    fn status(&self) -> Result<ConnectionStatus, GatewayError> {
        let state = self.enter("status")?;
        Ok(ConnectionStatus {
            status: "Connected".to_string(),
            uptime: 3600 + state.calls as u64,
            last_connection_error: "ERROR_NONE".to_string(),
        })
    }

    fn enumerate_mapping(&self, index: u32) -> Result<Option<PortMapping>, GatewayError> {
        let state = self.enter("enumerate_mapping")?;
        if state.enumeration_fails_at == Some(index) {
            return Err(GatewayError::InvalidResponse(format!("index {}", index)));
        }
        Ok(state.mappings.get(index as usize).cloned())
    }

    fn add_pinhole(&self, request: &PinholeRequest, lease_time: u32) -> Result<String, GatewayError> {
        let mut state = self.enter_igd2("add_pinhole")?;
        if lease_time == 0 || lease_time > 86400 {
            return Err(GatewayError::Rejected(format!("lease time {} out of range", lease_time)));
        }
        let unique_id = state.next_pinhole_id.to_string();
        state.next_pinhole_id += 1;
        state.pinholes.insert(
            unique_id.clone(),
            Pinhole {
                request: request.clone(),
                lease_time,
                packets: 0,
            },
        );
        Ok(unique_id)
    }

    fn update_pinhole(&self, unique_id: &str, lease_time: u32) -> Result<bool, GatewayError> {
        let mut state = self.enter_igd2("update_pinhole")?;
        if lease_time == 0 {
            return Ok(false);
        }
        state.pinhole(unique_id)?.lease_time = lease_time;
        Ok(true)
    }

    fn check_pinhole(&self, unique_id: &str) -> Result<bool, GatewayError> {
        let mut state = self.enter_igd2("check_pinhole")?;
        let pinhole = state.pinhole(unique_id)?;
        Ok(pinhole.lease_time > 0 && pinhole.request.internal_port != 0)
    }

    fn pinhole_packet_count(&self, unique_id: &str) -> Result<u64, GatewayError> {
        let mut state = self.enter_igd2("pinhole_packet_count")?;
        Ok(state.pinhole(unique_id)?.packets)
    }

    fn delete_pinhole(&self, unique_id: &str) -> Result<bool, GatewayError> {
        let mut state = self.enter_igd2("delete_pinhole")?;
        Ok(state.pinholes.remove(unique_id).is_some())
    }

    fn list_mappings(&self, start_index: u32, count: u32) -> Result<Vec<PortMapping>, GatewayError> {
        let state = self.enter_igd2("list_mappings")?;
        Ok(state
            .mappings
            .iter()
            .skip(start_index as usize)
            .take(count as usize)
            .cloned()
            .collect())
    }

    fn firewall_status(&self) -> Result<FirewallStatus, GatewayError> {
        let _state = self.enter_igd2("firewall_status")?;
        Ok(FirewallStatus {
            firewall_enabled: true,
            inbound_pinhole_allowed: true,
        })
    }

    fn outbound_pinhole_timeout(&self, _request: &PinholeRequest) -> Result<u32, GatewayError> {
        Ok(self.enter_igd2("outbound_pinhole_timeout")?.outbound_timeout)
    }

    fn presentation_base_url(&self) -> Result<Option<String>, GatewayError> {
        Ok(self.enter("presentation_base_url")?.base_url.clone())
    }
}
