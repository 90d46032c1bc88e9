use crate::core::domain::{
    error::ValidationError,
    value_object::{OmvEndpoint, OmvHost, OmvPassword, OmvPort, OmvUsername},
};

/// Everything needed to open a session on an openmediavault host.
///
/// Credentials are owned by the credential store; the client only borrows
/// them for a login and keeps a copy for silent re-authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    host: OmvHost,
    port: OmvPort,
    username: OmvUsername,
    password: OmvPassword,
    endpoint: OmvEndpoint,
}

impl Credentials {
    /// Validates raw user input (or stored values) into credentials.
    ///
    /// # Errors
    /// Returns `ValidationError` when any field is malformed.
    pub fn new(
        host: impl Into<String>,
        port: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::from_parts(
            OmvHost::new(host)?,
            OmvPort::parse(port)?,
            OmvUsername::new(username)?,
            OmvPassword::new(password, None)?,
        )
    }

    /// Assembles credentials from already validated parts.
    pub fn from_parts(
        host: OmvHost,
        port: OmvPort,
        username: OmvUsername,
        password: OmvPassword,
    ) -> Result<Self, ValidationError> {
        let endpoint = OmvEndpoint::new(&host, &port)?;
        Ok(Self {
            host,
            port,
            username,
            password,
            endpoint,
        })
    }

    pub fn host(&self) -> &OmvHost {
        &self.host
    }

    pub fn port(&self) -> &OmvPort {
        &self.port
    }

    pub fn username(&self) -> &OmvUsername {
        &self.username
    }

    pub fn password(&self) -> &OmvPassword {
        &self.password
    }

    /// The endpoint derived from host and port, `http://{host}:{port}`.
    pub fn endpoint(&self) -> &OmvEndpoint {
        &self.endpoint
    }
}
