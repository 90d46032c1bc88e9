use crate::core::domain::{error::ValidationError, value_object::serde_helpers::humantime_duration};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client-side rate limit for outgoing RPC calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Tunables of the authenticated RPC client.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Upper bound for every RPC exchange, login included.
    #[serde(default = "default_request_timeout", with = "humantime_duration")]
    pub request_timeout: Duration,
    /// Disabled when absent.
    #[serde(default)]
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            rate_limit: None,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.request_timeout.is_zero() {
            return Err(ValidationError::Field {
                field: "request_timeout".to_string(),
                message: "Request timeout must be greater than zero".to_string(),
            });
        }
        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.requests_per_second == 0 || rate_limit.burst_size == 0 {
                return Err(ValidationError::ConstraintViolation(
                    "Rate limit requests_per_second and burst_size must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}
