//! Bodies of the individual primitives.
//!
//! Each returns the values of its output slots in declaration order. Input slot 0 always holds the
//! gateway handle, except for `discover`, which creates one.

use log::{debug, info, warn};

use super::batch;
use super::binding::Inputs;
use super::dispatcher::{acknowledged, with_device, Dispatcher};
use crate::context::Value;
use crate::error_handling::types::{GatewayError, PrimitiveError};
use crate::gateway::client::{GatewayClient, GatewayHandle};
use crate::gateway::types::{ConnectionStatus, PinholeRequest, PortMapping};

impl From<&PortMapping> for Value {
    fn from(m: &PortMapping) -> Self {
        Value::record([
            ("external_port", Value::from(m.external_port)),
            ("protocol", Value::from(m.protocol.as_str())),
            ("internal_ip", Value::from(m.internal_ip.as_str())),
            ("internal_port", Value::from(m.internal_port)),
            ("description", Value::from(m.description.as_str())),
            ("lease_duration", Value::from(m.lease_duration)),
            ("enabled", Value::from(m.enabled)),
            ("remote_host", Value::from(m.remote_host.as_str())),
        ])
    }
}

impl From<&ConnectionStatus> for Value {
    fn from(s: &ConnectionStatus) -> Self {
        Value::record([
            ("status", Value::from(s.status.as_str())),
            ("uptime", Value::from(s.uptime)),
            (
                "last_connection_error",
                Value::from(s.last_connection_error.as_str()),
            ),
        ])
    }
}

/// Probes `GetGenericPortMappingEntry` from index 0 until the device reports no entry or fails.
fn enumerate_generic(client: &dyn GatewayClient) -> Vec<PortMapping> {
    let mut mappings = Vec::new();
    let mut index: u32 = 0;
    loop {
        match client.enumerate_mapping(index) {
            Ok(Some(mapping)) => mappings.push(mapping),
            Ok(None) => break,
            Err(e) => {
                debug!("Enumeration stopped at index {}: {}", index, e);
                break;
            }
        }
        index = match index.checked_add(1) {
            Some(next) => next,
            None => break,
        };
    }
    mappings
}

/// Same probing with IGD:2 `GetListOfPortMappings`, one entry per request.
fn enumerate_igd2(client: &dyn GatewayClient) -> Vec<PortMapping> {
    let mut mappings = Vec::new();
    let mut index: u32 = 0;
    loop {
        match client.list_mappings(index, 1) {
            Ok(entries) if entries.is_empty() => break,
            Ok(entries) => {
                let step = u32::try_from(entries.len()).unwrap_or(u32::MAX);
                mappings.extend(entries);
                index = match index.checked_add(step) {
                    Some(next) => next,
                    None => break,
                };
            }
            Err(e) => {
                debug!("IGD:2 enumeration stopped at index {}: {}", index, e);
                break;
            }
        }
    }
    mappings
}

fn pinhole_request(inputs: &Inputs) -> Result<PinholeRequest, PrimitiveError> {
    Ok(PinholeRequest {
        remote_ip: inputs.text(1)?,
        remote_port: inputs.port_or_any(2)?,
        internal_ip: inputs.text(3)?,
        internal_port: inputs.port_or_any(4)?,
        protocol: inputs.protocol(5)?,
    })
}

impl Dispatcher {
    pub(super) fn discover(&self) -> Result<Vec<Value>, PrimitiveError> {
        let mut client = self.new_client();

        let found = client
            .discover()
            .map_err(|e| PrimitiveError::device("discover gateways", e))?;
        info!("Devices discovered: {}", found);
        if found == 0 {
            return Err(PrimitiveError::device("discover gateways", GatewayError::NoDevice));
        }

        client
            .select_device()
            .map_err(|e| PrimitiveError::device("select gateway", e))?;
        let lan_ip = client
            .lan_address()
            .map_err(|e| PrimitiveError::device("read LAN address", e))?;
        let external_ip = client
            .external_ip()
            .map_err(|e| PrimitiveError::device("read external IP address", e))?;
        info!(
            "Selected UPnP device: LAN IP address {}, external IP address {}",
            lan_ip, external_ip
        );

        Ok(vec![
            Value::Handle(GatewayHandle::new(client)),
            Value::from(lan_ip),
            Value::from(external_ip),
        ])
    }

    pub(super) fn add_port_mapping(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let lan_ip = inputs.text(1)?;
        let external_ip = inputs.value(2)?.clone();
        let external_port = inputs.port(3)?;
        let internal_port = inputs.port(4)?;
        let protocol = inputs.protocol(5)?;

        let ack = with_device(inputs, "add port mapping", |c| {
            c.add_mapping(
                external_port,
                protocol,
                &lan_ip,
                internal_port,
                &self.mapping().description,
                "",
            )
        })?;
        acknowledged("add port mapping", ack)?;
        info!(
            "Port mapping added: external port {} -> {}:{} [{}]",
            external_port, lan_ip, internal_port, protocol
        );
        Ok(vec![external_ip, Value::from(external_port)])
    }

    pub(super) fn delete_port_mapping(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let external_port = inputs.port(1)?;
        let protocol = inputs.protocol(2)?;

        let deleted = with_device(inputs, "delete port mapping", |c| {
            c.delete_mapping(external_port, protocol)
        })?;
        info!(
            "Delete port mapping result for {}/{}: {}",
            external_port, protocol, deleted
        );
        Ok(vec![Value::from(deleted)])
    }

    pub(super) fn get_status(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let status = with_device(inputs, "get connection status", |c| c.status())?;
        let external_ip = with_device(inputs, "read external IP address", |c| c.external_ip())?;
        info!(
            "UPnP connection status: {} (uptime {}s, last error {})",
            status.status, status.uptime, status.last_connection_error
        );
        Ok(vec![Value::from(external_ip), Value::from(&status)])
    }

    pub(super) fn list_port_mappings(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let mappings = with_device(inputs, "list port mappings", |c| Ok(enumerate_generic(c)))?;
        info!("Found {} port mappings", mappings.len());
        Ok(vec![Value::List(mappings.iter().map(Value::from).collect())])
    }

    pub(super) fn add_any_port_mapping(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let internal_ip = inputs.text(1)?;
        let internal_port = inputs.port(2)?;
        let suggested_port = inputs.port(3)?;
        let protocol = inputs.protocol(4)?;
        let duration = inputs.seconds(5)?;

        let actual = with_device(inputs, "add any port mapping", |c| {
            c.add_any_mapping(
                suggested_port,
                protocol,
                &internal_ip,
                internal_port,
                &self.mapping().any_description,
                "",
                duration,
            )
        })?;
        if actual == 0 {
            return Err(PrimitiveError::device(
                "add any port mapping",
                GatewayError::InvalidResponse("no external port assigned".to_string()),
            ));
        }
        info!(
            "Requested external port: {}, actual assigned: {}",
            suggested_port, actual
        );
        Ok(vec![Value::from(actual)])
    }

    pub(super) fn delete_port_range(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let start = inputs.port(1)?;
        let end = inputs.port(2)?;
        let protocol = inputs.protocol(3)?;
        let client = inputs.handle(0)?.client();

        if start > end {
            debug!("Empty port range {}..={}", start, end);
        }
        let mut deleted = Vec::new();
        for port in start..=end {
            match client.delete_mapping(port, protocol) {
                Ok(true) => deleted.push(port),
                Ok(false) => debug!("Gateway kept mapping {}/{}", port, protocol),
                Err(e) => warn!("Failed to delete port {}/{}: {}", port, protocol, e),
            }
        }
        info!("Deleted ports: {:?}", deleted);
        Ok(vec![Value::from(deleted)])
    }

    pub(super) fn add_multiple_port_mappings(
        &self,
        inputs: &Inputs,
    ) -> Result<Vec<Value>, PrimitiveError> {
        let client = inputs.handle(0)?.client();
        let internal_ip = inputs.text(1)?;
        let triples = batch::resolve(inputs.tail(2))?;

        let results = batch::apply(client, &internal_ip, &self.mapping().bulk_description, &triples);
        Ok(vec![Value::from(results)])
    }

    pub(super) fn add_pinhole(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let request = pinhole_request(inputs)?;
        let lease_time = inputs.seconds(6)?;

        let unique_id = with_device(inputs, "add pinhole", |c| c.add_pinhole(&request, lease_time))?;
        if unique_id.is_empty() {
            return Err(PrimitiveError::device(
                "add pinhole",
                GatewayError::InvalidResponse("empty unique id".to_string()),
            ));
        }
        info!("Pinhole created. Unique ID: {}", unique_id);
        Ok(vec![Value::from(unique_id)])
    }

    pub(super) fn update_pinhole(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let unique_id = inputs.text(1)?;
        let lease_time = inputs.seconds(2)?;

        let updated = with_device(inputs, "update pinhole", |c| {
            c.update_pinhole(&unique_id, lease_time)
        })?;
        info!("Update pinhole {} lease time result: {}", unique_id, updated);
        Ok(vec![Value::from(updated)])
    }

    pub(super) fn check_pinhole(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let unique_id = inputs.text(1)?;
        let working = with_device(inputs, "check pinhole", |c| c.check_pinhole(&unique_id))?;
        info!("Pinhole {} working: {}", unique_id, working);
        Ok(vec![Value::from(working)])
    }

    pub(super) fn get_pinhole_packet_count(
        &self,
        inputs: &Inputs,
    ) -> Result<Vec<Value>, PrimitiveError> {
        let unique_id = inputs.text(1)?;
        let packets = with_device(inputs, "get pinhole packet count", |c| {
            c.pinhole_packet_count(&unique_id)
        })?;
        info!("Pinhole {} packet count: {}", unique_id, packets);
        Ok(vec![Value::from(packets)])
    }

    pub(super) fn delete_pinhole(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let unique_id = inputs.text(1)?;
        let deleted = with_device(inputs, "delete pinhole", |c| c.delete_pinhole(&unique_id))?;
        info!("Pinhole {} deleted: {}", unique_id, deleted);
        Ok(vec![Value::from(deleted)])
    }

    pub(super) fn list_port_mappings_igd2(
        &self,
        inputs: &Inputs,
    ) -> Result<Vec<Value>, PrimitiveError> {
        let mappings = with_device(inputs, "list port mappings (IGD:2)", |c| Ok(enumerate_igd2(c)))?;
        info!("Found {} port mappings", mappings.len());
        Ok(vec![Value::List(mappings.iter().map(Value::from).collect())])
    }

    pub(super) fn get_firewall_status(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let status = with_device(inputs, "get firewall status", |c| c.firewall_status())?;
        info!(
            "Firewall enabled: {}, inbound pinhole allowed: {}",
            status.firewall_enabled, status.inbound_pinhole_allowed
        );
        Ok(vec![
            Value::from(status.firewall_enabled),
            Value::from(status.inbound_pinhole_allowed),
        ])
    }

    pub(super) fn get_outbound_pinhole_timeout(
        &self,
        inputs: &Inputs,
    ) -> Result<Vec<Value>, PrimitiveError> {
        let request = pinhole_request(inputs)?;
        let timeout = with_device(inputs, "get outbound pinhole timeout", |c| {
            c.outbound_pinhole_timeout(&request)
        })?;
        info!("Outbound pinhole timeout: {} seconds", timeout);
        Ok(vec![Value::from(timeout)])
    }

    pub(super) fn get_presentation_url(&self, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        let url = with_device(inputs, "get presentation URL", |c| c.presentation_base_url())?
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                PrimitiveError::device(
                    "get presentation URL",
                    GatewayError::InvalidResponse("device has no base URL".to_string()),
                )
            })?;
        info!("Presentation URL: {}", url);
        Ok(vec![Value::from(url)])
    }
}
