//! Batch mapping resolution.
//!
//! The tail of an `add_multiple_port_mappings` invocation is a flat list of variable values
//! grouped as `internal_port [external_port] protocol`. The optional external port is told apart
//! from the protocol by the type of the token alone: an integer continues the group, a string
//! closes it.
//!
//! ```text
//! [80, "TCP", 443, 8443, "TCP"]  ->  (80 -> 80, TCP), (443 -> 8443, TCP)
//! ```
//!
//! Resolution runs to completion before any device call, so a malformed tail fails the whole
//! batch with no mapping attempted.

use log::{debug, info, warn};

use super::binding;
use crate::context::Value;
use crate::error_handling::types::PrimitiveError;
use crate::gateway::client::GatewayClient;
use crate::gateway::types::Protocol;

/// A tail token after type classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Int(i64),
    Str(String),
}

impl Token {
    /// `None` for values that can appear nowhere in the grammar.
    pub fn classify(value: &Value) -> Option<Token> {
        match value {
            Value::Int(i) => Some(Token::Int(*i)),
            Value::Str(s) => Some(Token::Str(s.clone())),
            _ => None,
        }
    }
}

/// One resolved group of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingTriple {
    pub internal_port: u16,
    pub external_port: u16,
    pub protocol: Protocol,
}

/// Outcome of one mapping attempt, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingResult {
    pub internal_port: u16,
    pub external_port: u16,
    pub protocol: Protocol,
    pub success: bool,
}

impl From<MappingResult> for Value {
    fn from(result: MappingResult) -> Self {
        Value::record([
            ("internal_port", Value::from(result.internal_port)),
            ("external_port", Value::from(result.external_port)),
            ("protocol", Value::from(result.protocol.as_str())),
            ("success", Value::from(result.success)),
        ])
    }
}

fn malformed<S: Into<String>>(reason: S) -> PrimitiveError {
    PrimitiveError::MalformedBatchRequest(reason.into())
}

fn group_port(position: usize, value: &Value) -> Result<u16, PrimitiveError> {
    binding::port(&format!("token {}", position), value).map_err(|e| malformed(e.to_string()))
}

/// Groups `tail` into mapping triples.
///
/// # Errors
/// `PrimitiveError::MalformedBatchRequest` when a group does not start with an integer, lacks its
/// protocol token, names an unknown protocol, or holds a value that is neither integer nor string.
pub fn resolve(tail: &[Value]) -> Result<Vec<MappingTriple>, PrimitiveError> {
    let mut tokens = tail.iter().enumerate().peekable();
    let mut triples = Vec::new();

    while let Some((position, value)) = tokens.next() {
        let internal_port = match Token::classify(value) {
            Some(_) => group_port(position, value)?,
            None => {
                return Err(malformed(format!(
                    "token {} must be an internal port, found {}",
                    position,
                    value.kind()
                )))
            }
        };

        let external_port = match tokens.peek() {
            Some((next, candidate)) if matches!(Token::classify(candidate), Some(Token::Int(_))) => {
                let port = group_port(*next, candidate)?;
                tokens.next();
                port
            }
            _ => internal_port,
        };

        let protocol = match tokens.next() {
            Some((position, value)) => match Token::classify(value) {
                Some(Token::Str(name)) => name
                    .parse::<Protocol>()
                    .map_err(|e| malformed(format!("token {}: {}", position, e)))?,
                _ => {
                    return Err(malformed(format!(
                        "token {} must be a protocol, found {}",
                        position,
                        value.kind()
                    )))
                }
            },
            None => {
                return Err(malformed(format!(
                    "mapping for internal port {} has no protocol",
                    internal_port
                )))
            }
        };

        debug!(
            "resolved mapping {} -> {} [{}]",
            external_port, internal_port, protocol
        );
        triples.push(MappingTriple {
            internal_port,
            external_port,
            protocol,
        });
    }

    Ok(triples)
}

/// Issues one add-mapping request per triple; a failed attempt only marks its own result.
pub fn apply(
    client: &dyn GatewayClient,
    internal_ip: &str,
    description: &str,
    triples: &[MappingTriple],
) -> Vec<MappingResult> {
    let results: Vec<MappingResult> = triples
        .iter()
        .map(|t| {
            let success = match client.add_mapping(
                t.external_port,
                t.protocol,
                internal_ip,
                t.internal_port,
                description,
                "",
            ) {
                Ok(acknowledged) => acknowledged,
                Err(e) => {
                    warn!(
                        "Failed to add mapping {} -> {}:{} [{}]: {}",
                        t.external_port, internal_ip, t.internal_port, t.protocol, e
                    );
                    false
                }
            };
            MappingResult {
                internal_port: t.internal_port,
                external_port: t.external_port,
                protocol: t.protocol,
                success,
            }
        })
        .collect();

    info!(
        "Added {} of {} mappings",
        results.iter().filter(|r| r.success).count(),
        results.len()
    );
    results
}
