use crate::core::domain::error::ValidationError;
use std::fmt;
use zxcvbn::zxcvbn;

/// An openmediavault password (plaintext, only held in memory).
///
/// `Debug` is redacted so credentials can be logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct OmvPassword(String);

impl OmvPassword {
    /// Creates a validated password, optionally enforcing a minimum strength.
    pub fn new(
        password: impl Into<String>,
        min_score: Option<zxcvbn::Score>,
    ) -> Result<Self, ValidationError> {
        let password = password.into();
        validate_password(&password, min_score)?;
        Ok(Self(password))
    }

    #[cfg(test)]
    pub(crate) fn new_unchecked(password: String) -> Self {
        Self(password)
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OmvPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OmvPassword(***)")
    }
}

/// Validates a password, with an optional zxcvbn strength floor.
pub(crate) fn validate_password(
    password: &str,
    min_score: Option<zxcvbn::Score>,
) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Field {
            field: "password".to_string(),
            message: "Password cannot be empty".to_string(),
        });
    }
    if password.len() > 256 {
        return Err(ValidationError::Format(
            "Password cannot exceed 256 characters".to_string(),
        ));
    }
    if let Some(min_score) = min_score {
        let entropy = zxcvbn(password, &[]);
        if entropy.score() < min_score {
            return Err(ValidationError::ConstraintViolation(
                "Password is too weak (increase complexity)".to_string(),
            ));
        }
    }
    Ok(())
}
