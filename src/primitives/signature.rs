//! Primitive names and their declared input/output arity.

use std::fmt;
use std::str::FromStr;

use crate::error_handling::types::PrimitiveError;

/// Number of input slots a primitive accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// A fixed prefix followed by any number of extra slots.
    Dynamic { prefix: usize },
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == *n,
            Arity::Dynamic { prefix } => count >= *prefix,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Dynamic { prefix } => write!(f, "at least {}", prefix),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub inputs: Arity,
    pub outputs: usize,
}

impl Signature {
    const fn fixed(inputs: usize, outputs: usize) -> Self {
        Self {
            inputs: Arity::Fixed(inputs),
            outputs,
        }
    }
}

/// Every IGD operation a flow can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Discover,
    AddPortMapping,
    DeletePortMapping,
    GetStatus,
    ListPortMappings,
    AddAnyPortMapping,
    DeletePortRange,
    AddMultiplePortMappings,
    AddPinhole,
    UpdatePinhole,
    CheckPinhole,
    GetPinholePacketCount,
    DeletePinhole,
    ListPortMappingsIgd2,
    GetFirewallStatus,
    GetOutboundPinholeTimeout,
    GetPresentationUrl,
}

impl Primitive {
    pub const ALL: [Primitive; 17] = [
        Primitive::Discover,
        Primitive::AddPortMapping,
        Primitive::DeletePortMapping,
        Primitive::GetStatus,
        Primitive::ListPortMappings,
        Primitive::AddAnyPortMapping,
        Primitive::DeletePortRange,
        Primitive::AddMultiplePortMappings,
        Primitive::AddPinhole,
        Primitive::UpdatePinhole,
        Primitive::CheckPinhole,
        Primitive::GetPinholePacketCount,
        Primitive::DeletePinhole,
        Primitive::ListPortMappingsIgd2,
        Primitive::GetFirewallStatus,
        Primitive::GetOutboundPinholeTimeout,
        Primitive::GetPresentationUrl,
    ];

    /// Name used by flows to refer to the primitive.
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Discover => "discover",
            Primitive::AddPortMapping => "add_port_mapping",
            Primitive::DeletePortMapping => "delete_port_mapping",
            Primitive::GetStatus => "get_status",
            Primitive::ListPortMappings => "list_port_mappings",
            Primitive::AddAnyPortMapping => "add_any_port_mapping",
            Primitive::DeletePortRange => "delete_port_range",
            Primitive::AddMultiplePortMappings => "add_multiple_port_mappings",
            Primitive::AddPinhole => "add_pinhole",
            Primitive::UpdatePinhole => "update_pinhole",
            Primitive::CheckPinhole => "check_pinhole",
            Primitive::GetPinholePacketCount => "get_pinhole_packet_count",
            Primitive::DeletePinhole => "delete_pinhole",
            Primitive::ListPortMappingsIgd2 => "list_port_mappings_igd2",
            Primitive::GetFirewallStatus => "get_firewall_status",
            Primitive::GetOutboundPinholeTimeout => "get_outbound_pinhole_timeout",
            Primitive::GetPresentationUrl => "get_presentation_url",
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            Primitive::Discover => Signature::fixed(0, 3),
            Primitive::AddPortMapping => Signature::fixed(6, 2),
            Primitive::DeletePortMapping => Signature::fixed(3, 1),
            Primitive::GetStatus => Signature::fixed(1, 2),
            Primitive::ListPortMappings => Signature::fixed(1, 1),
            Primitive::AddAnyPortMapping => Signature::fixed(6, 1),
            Primitive::DeletePortRange => Signature::fixed(4, 1),
            Primitive::AddMultiplePortMappings => Signature {
                inputs: Arity::Dynamic { prefix: 2 },
                outputs: 1,
            },
            Primitive::AddPinhole => Signature::fixed(7, 1),
            Primitive::UpdatePinhole => Signature::fixed(3, 1),
            Primitive::CheckPinhole => Signature::fixed(2, 1),
            Primitive::GetPinholePacketCount => Signature::fixed(2, 1),
            Primitive::DeletePinhole => Signature::fixed(2, 1),
            Primitive::ListPortMappingsIgd2 => Signature::fixed(1, 1),
            Primitive::GetFirewallStatus => Signature::fixed(1, 2),
            Primitive::GetOutboundPinholeTimeout => Signature::fixed(6, 1),
            Primitive::GetPresentationUrl => Signature::fixed(1, 1),
        }
    }

    /// Whether the primitive reads a gateway handle from its first input.
    pub fn needs_handle(&self) -> bool {
        !matches!(self, Primitive::Discover)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Primitive {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Primitive::ALL
            .iter()
            .find(|p| p.name() == s)
            .copied()
            .ok_or_else(|| PrimitiveError::UnknownPrimitive(s.to_string()))
    }
}
