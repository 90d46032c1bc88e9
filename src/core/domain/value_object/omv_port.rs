use crate::core::domain::error::ValidationError;

/// A validated TCP port of the openmediavault web interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OmvPort(u16);

impl OmvPort {
    /// Parses and validates a port as it is entered by the user or read from
    /// the credential store.
    pub fn parse(port: &str) -> Result<Self, ValidationError> {
        let value = port.trim().parse::<u16>().map_err(|_| ValidationError::Field {
            field: "port".to_string(),
            message: format!("'{}' is not a port number", port),
        })?;
        validate_port(value)?;
        Ok(Self(value))
    }

    /// Returns the port number.
    pub fn get(&self) -> u16 {
        self.0
    }
}

/// Validates a port number.
pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::Field {
            field: "port".to_string(),
            message: "Port cannot be 0".to_string(),
        });
    }
    Ok(())
}
