use crate::core::domain::error::ValidationError;
use std::fmt;
use std::time::{Duration, SystemTime};

/// An openmediavault session id as issued by `Session.login`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    created_at: SystemTime,
}

impl SessionToken {
    /// Creates a validated token.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_token(&value)?;
        Ok(Self::new_unchecked(value))
    }

    /// Creates a new token without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self {
            value,
            created_at: SystemTime::now(),
        }
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the creation time.
    #[must_use]
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Returns how long ago the token was issued.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed().unwrap_or_default()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"***")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A session token is opaque; the only requirement is that it is usable as
/// an HTTP header value.
pub(crate) fn validate_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "token".to_string(),
            message: "Session token cannot be empty".to_string(),
        });
    }
    if !token.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::Format(
            "Session token must be printable ASCII without whitespace".to_string(),
        ));
    }
    Ok(())
}
