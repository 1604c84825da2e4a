//! Primitive Dispatcher
//!
//! Every primitive goes through the same steps in [`Dispatcher::invoke`]:
//! 1. Inputs are resolved through the [`ExecutionContext`], before any output is touched, so an
//!    output may reuse the name of an input.
//! 2. All declared output variables are reset to [`Value::Unset`].
//! 3. Input/output counts are checked against the primitive's [`Signature`].
//! 4. Primitives other than `discover` stop here, without any device call, when their first
//!    input does not hold a gateway handle.
//! 5. The operation runs; only a complete success overwrites the outputs.
//!
//! Failures are logged and returned as an [`Outcome`] value. They are never raised to the flow,
//! which branches on the output variables instead.
//!
//! [`Signature`]: super::signature::Signature

use log::{debug, warn};

use super::binding::Inputs;
use super::signature::Primitive;
use crate::configuration::{Config, MappingConfig};
use crate::context::{ExecutionContext, Value};
use crate::error_handling::types::{GatewayError, PrimitiveError};
use crate::gateway::{GatewayClient, IgdClient, SimulatedGateway};

/// Builds an undiscovered client each time `discover` runs.
pub type GatewayFactory = Box<dyn Fn() -> Box<dyn GatewayClient>>;

/// What happened to one invocation. Purely informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed(PrimitiveError),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn error(&self) -> Option<&PrimitiveError> {
        match self {
            Outcome::Completed => None,
            Outcome::Failed(e) => Some(e),
        }
    }
}

pub struct Dispatcher {
    factory: GatewayFactory,
    mapping: MappingConfig,
}

impl Dispatcher {
    pub fn new(factory: GatewayFactory, mapping: MappingConfig) -> Self {
        Self { factory, mapping }
    }

    /// Dispatcher discovering real gateways on the local network.
    pub fn from_config(config: &Config) -> Self {
        let discovery = config.discovery.clone();
        Self::new(
            Box::new(move || Box::new(IgdClient::new(discovery.clone())) as Box<dyn GatewayClient>),
            config.mapping.clone(),
        )
    }

    /// Dispatcher whose `discover` always finds `gateway` (or a clone sharing its state).
    pub fn simulated(gateway: SimulatedGateway, mapping: MappingConfig) -> Self {
        Self::new(
            Box::new(move || Box::new(gateway.clone()) as Box<dyn GatewayClient>),
            mapping,
        )
    }

    pub fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    pub(super) fn new_client(&self) -> Box<dyn GatewayClient> {
        (self.factory)()
    }

    /// Looks `name` up and invokes it; unknown names still reset the outputs.
    pub fn invoke_named<S: AsRef<str>>(
        &self,
        name: &str,
        inputs: &[S],
        outputs: &[S],
        ctx: &mut dyn ExecutionContext,
    ) -> Outcome {
        match name.parse::<Primitive>() {
            Ok(primitive) => self.invoke(primitive, inputs, outputs, ctx),
            Err(e) => {
                reset_outputs(outputs, ctx);
                warn!("{}", e);
                Outcome::Failed(e)
            }
        }
    }

    /// Runs `primitive` reading `inputs` and writing `outputs`, both variable names.
    pub fn invoke<S: AsRef<str>>(
        &self,
        primitive: Primitive,
        inputs: &[S],
        outputs: &[S],
        ctx: &mut dyn ExecutionContext,
    ) -> Outcome {
        let bound = Inputs::resolve(&*ctx, inputs);
        reset_outputs(outputs, ctx);
        debug!(
            "[{}] invoked with {} inputs, {} outputs",
            primitive,
            inputs.len(),
            outputs.len()
        );

        match self.run(primitive, &bound, outputs.len()) {
            Ok(values) => {
                for (name, value) in outputs.iter().zip(values) {
                    ctx.set_variable(name.as_ref(), value);
                }
                Outcome::Completed
            }
            Err(e) => {
                warn!("[{}] {}", primitive, e);
                Outcome::Failed(e)
            }
        }
    }

    fn run(
        &self,
        primitive: Primitive,
        inputs: &Inputs,
        output_count: usize,
    ) -> Result<Vec<Value>, PrimitiveError> {
        let signature = primitive.signature();
        if !signature.inputs.accepts(inputs.len()) {
            return Err(PrimitiveError::ArityMismatch {
                primitive: primitive.name(),
                expected: format!("{} inputs", signature.inputs),
                found: inputs.len(),
            });
        }
        if output_count != signature.outputs {
            return Err(PrimitiveError::ArityMismatch {
                primitive: primitive.name(),
                expected: format!("{} outputs", signature.outputs),
                found: output_count,
            });
        }

        if primitive.needs_handle() {
            inputs.handle(0)?;
        }

        let values = self.execute(primitive, inputs)?;
        debug_assert_eq!(values.len(), signature.outputs);
        Ok(values)
    }

    fn execute(&self, primitive: Primitive, inputs: &Inputs) -> Result<Vec<Value>, PrimitiveError> {
        match primitive {
            Primitive::Discover => self.discover(),
            Primitive::AddPortMapping => self.add_port_mapping(inputs),
            Primitive::DeletePortMapping => self.delete_port_mapping(inputs),
            Primitive::GetStatus => self.get_status(inputs),
            Primitive::ListPortMappings => self.list_port_mappings(inputs),
            Primitive::AddAnyPortMapping => self.add_any_port_mapping(inputs),
            Primitive::DeletePortRange => self.delete_port_range(inputs),
            Primitive::AddMultiplePortMappings => self.add_multiple_port_mappings(inputs),
            Primitive::AddPinhole => self.add_pinhole(inputs),
            Primitive::UpdatePinhole => self.update_pinhole(inputs),
            Primitive::CheckPinhole => self.check_pinhole(inputs),
            Primitive::GetPinholePacketCount => self.get_pinhole_packet_count(inputs),
            Primitive::DeletePinhole => self.delete_pinhole(inputs),
            Primitive::ListPortMappingsIgd2 => self.list_port_mappings_igd2(inputs),
            Primitive::GetFirewallStatus => self.get_firewall_status(inputs),
            Primitive::GetOutboundPinholeTimeout => self.get_outbound_pinhole_timeout(inputs),
            Primitive::GetPresentationUrl => self.get_presentation_url(inputs),
        }
    }
}

fn reset_outputs<S: AsRef<str>>(outputs: &[S], ctx: &mut dyn ExecutionContext) {
    for name in outputs {
        ctx.set_variable(name.as_ref(), Value::Unset);
    }
}

/// Runs one device call against the handle in input slot 0.
pub(super) fn with_device<T, F>(
    inputs: &Inputs,
    operation: &'static str,
    call: F,
) -> Result<T, PrimitiveError>
where
    F: FnOnce(&dyn GatewayClient) -> Result<T, GatewayError>,
{
    let handle = inputs.handle(0)?;
    call(handle.client()).map_err(|e| PrimitiveError::device(operation, e))
}

/// Turns a `false` acknowledgment into a device failure.
pub(super) fn acknowledged(operation: &'static str, ack: bool) -> Result<(), PrimitiveError> {
    if ack {
        Ok(())
    } else {
        Err(PrimitiveError::device(
            operation,
            GatewayError::Rejected("request not acknowledged".to_string()),
        ))
    }
}
