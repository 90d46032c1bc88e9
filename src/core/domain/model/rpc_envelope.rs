//! The openmediavault JSON-RPC wire format.
//!
//! Requests are `{"service", "method", "params"?}`; replies carry either a
//! `response` or an `error` member and may do so with HTTP 200 in both cases.

use crate::core::domain::error::TransportError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// A JSON-RPC request.
#[derive(Clone, PartialEq, Serialize)]
pub struct RpcEnvelope {
    service: String,
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Map<String, Value>>,
}

impl RpcEnvelope {
    /// Creates a request without parameters; `params` is omitted on the wire.
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
            params: None,
        }
    }

    /// Adds one parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sends an empty `params` object, which some methods require.
    pub fn empty_params(mut self) -> Self {
        self.params.get_or_insert_with(Map::new);
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&Map<String, Value>> {
        self.params.as_ref()
    }
}

// Parameter values are left out: the login request carries the password.
impl fmt::Debug for RpcEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcEnvelope")
            .field("service", &self.service)
            .field("method", &self.method)
            .field(
                "params",
                &self.params.as_ref().map(|p| p.keys().collect::<Vec<_>>()),
            )
            .finish()
    }
}

impl fmt::Display for RpcEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.method)
    }
}

/// Interprets the body of an HTTP 200 reply.
///
/// A non-null `error` always wins over `response`. A document without a
/// `response` member is returned whole.
pub(crate) fn decode_reply(body: &[u8]) -> Result<Value, TransportError> {
    let document: Value = serde_json::from_slice(body)
        .map_err(|e| TransportError::Malformed(format!("invalid JSON: {}", e)))?;

    let Value::Object(mut object) = document else {
        return Err(TransportError::Malformed(
            "reply is not a JSON object".to_string(),
        ));
    };

    match object.get("error") {
        None | Some(Value::Null) => {}
        Some(error) => return Err(TransportError::Remote(error_message(error))),
    }

    match object.remove("response") {
        Some(response) => Ok(response),
        None => Ok(Value::Object(object)),
    }
}

fn error_message(error: &Value) -> String {
    match error {
        Value::Object(fields) => match fields.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => error.to_string(),
        },
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}
