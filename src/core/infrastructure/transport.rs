//! One JSON-RPC exchange over HTTP.

use crate::core::domain::{
    error::{OmvResult, TransportError},
    model::rpc_envelope::{RpcEnvelope, decode_reply},
    value_object::{OmvEndpoint, SessionToken},
};
use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Header carrying the session id on authenticated requests.
pub const SESSION_HEADER: &str = "X-Openmediavault-Sessionid";

/// A stateless request/response exchange with the RPC endpoint.
///
/// Implementations classify outcomes but never retry, never log in, and never
/// hold session state.
#[async_trait]
pub trait RpcTransport: fmt::Debug + Send + Sync {
    /// POSTs `envelope` to `{endpoint}/rpc.php`, attaching `token` when given.
    async fn execute(
        &self,
        endpoint: &OmvEndpoint,
        envelope: &RpcEnvelope,
        token: Option<&SessionToken>,
        timeout: Duration,
    ) -> Result<Value, TransportError>;

    /// Sends an unauthenticated GET to `{endpoint}/rpc.php` and returns the
    /// HTTP status, whatever it is.
    async fn probe(&self, endpoint: &OmvEndpoint, timeout: Duration) -> Result<u16, TransportError>;
}

/// `RpcTransport` over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
}

impl HttpTransport {
    /// Creates a transport with its own HTTP client.
    ///
    /// # Errors
    /// Returns `OmvError::Transport` if the HTTP client cannot be built.
    pub fn new() -> OmvResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = Client::builder()
            .user_agent(concat!("omv_monitor/", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn execute(
        &self,
        endpoint: &OmvEndpoint,
        envelope: &RpcEnvelope,
        token: Option<&SessionToken>,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        debug!(rpc = %envelope, endpoint = %endpoint, authenticated = token.is_some(), "sending rpc request");

        let mut req_builder = self
            .http_client
            .post(endpoint.rpc_url())
            .timeout(timeout)
            .json(envelope);

        if let Some(token) = token {
            req_builder = req_builder.header(SESSION_HEADER, token.as_str());
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                debug!(rpc = %envelope, "rpc request unauthorized");
                return Err(TransportError::Unauthorized);
            }
            status => {
                debug!(rpc = %envelope, status = status.as_u16(), "rpc request failed");
                return Err(TransportError::Http(status.as_u16()));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("failed to read response: {}", e)))?;

        decode_reply(&body)
    }

    async fn probe(&self, endpoint: &OmvEndpoint, timeout: Duration) -> Result<u16, TransportError> {
        let response = self
            .http_client
            .get(endpoint.rpc_url())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}
