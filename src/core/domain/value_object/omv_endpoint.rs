use crate::core::domain::{
    error::ValidationError,
    value_object::{omv_host::OmvHost, omv_port::OmvPort},
};
use std::fmt;

const RPC_PATH: &str = "rpc.php";

/// The base address of an openmediavault web interface, `http://{host}:{port}`.
///
/// # Examples
///
/// ```
/// use omv_monitor::{OmvEndpoint, OmvHost, OmvPort};
///
/// let host = OmvHost::new("nas.local").unwrap();
/// let port = OmvPort::parse("8080").unwrap();
/// let endpoint = OmvEndpoint::new(&host, &port).unwrap();
/// assert_eq!(endpoint.as_str(), "http://nas.local:8080");
/// assert_eq!(endpoint.rpc_url(), "http://nas.local:8080/rpc.php");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OmvEndpoint(String);

impl OmvEndpoint {
    /// Builds the endpoint for a host and port.
    pub fn new(host: &OmvHost, port: &OmvPort) -> Result<Self, ValidationError> {
        let host = host.as_str();
        let host = if host.contains(':') {
            format!("[{}]", host)
        } else {
            host.to_string()
        };
        Self::parse(&format!("http://{}:{}", host, port.get()))
    }

    /// Parses an already formatted base URL such as `http://10.0.0.2:80`.
    pub fn parse(base: &str) -> Result<Self, ValidationError> {
        validate_endpoint(base)?;
        Ok(Self(base.trim_end_matches('/').to_string()))
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the JSON-RPC URL, `{endpoint}/rpc.php`.
    #[must_use]
    pub fn rpc_url(&self) -> String {
        format!("{}/{}", self.0, RPC_PATH)
    }
}

impl fmt::Display for OmvEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a base URL: http(s) scheme, a host, and no path beyond `/`.
pub(crate) fn validate_endpoint(base: &str) -> Result<(), ValidationError> {
    if base.is_empty() {
        return Err(ValidationError::Field {
            field: "endpoint".to_string(),
            message: "Endpoint cannot be empty".to_string(),
        });
    }

    let url = url::Url::parse(base)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme '{}'. Must be one of: http, https",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ValidationError::Format("Endpoint has no host".to_string()));
    }

    if url.path() != "/" {
        return Err(ValidationError::ConstraintViolation(
            "Endpoint must not contain a path".to_string(),
        ));
    }

    Ok(())
}
