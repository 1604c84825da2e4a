//! Gateway subsystem.
//!
//! This module abstracts the Internet Gateway Device the primitives drive.
//!
//! Components:
//! - `client`: the `GatewayClient` trait and the `GatewayHandle` passed between primitives.
//! - `types`: mappings, pinholes, status records and the `Protocol` enum.
//! - `igd_client`: network implementation on top of `igd-next`.
//! - `simulated`: in-memory device for tests and dry runs.

pub mod client;
pub mod igd_client;
pub mod simulated;
pub mod types;

pub use client::{GatewayClient, GatewayHandle};
pub use igd_client::IgdClient;
pub use simulated::SimulatedGateway;
pub use types::{ConnectionStatus, FirewallStatus, PinholeRequest, PortMapping, Protocol};
