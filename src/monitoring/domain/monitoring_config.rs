use crate::core::domain::{error::ValidationError, value_object::serde_helpers::humantime_duration};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process-wide monitoring switches.
///
/// Only changed through the explicit enable/disable operations of
/// `MonitoringSettings`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub health_alerts_enabled: bool,
    #[serde(default)]
    pub storage_alerts_enabled: bool,
    /// Filesystems at or above this usage raise a storage alert.
    #[serde(default = "default_storage_threshold_percent")]
    pub storage_threshold_percent: u8,
    /// Earliest start of the next check after one has run.
    #[serde(default = "default_check_interval", with = "humantime_duration")]
    pub check_interval: Duration,
    #[serde(default = "default_liveness_timeout", with = "humantime_duration")]
    pub liveness_timeout: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            health_alerts_enabled: false,
            storage_alerts_enabled: false,
            storage_threshold_percent: default_storage_threshold_percent(),
            check_interval: default_check_interval(),
            liveness_timeout: default_liveness_timeout(),
        }
    }
}

impl MonitoringConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_threshold(self.storage_threshold_percent)?;
        if self.check_interval.is_zero() {
            return Err(ValidationError::Field {
                field: "check_interval".to_string(),
                message: "Check interval must be greater than zero".to_string(),
            });
        }
        if self.liveness_timeout.is_zero() {
            return Err(ValidationError::Field {
                field: "liveness_timeout".to_string(),
                message: "Liveness timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_threshold(percent: u8) -> Result<(), ValidationError> {
    if !(1..=100).contains(&percent) {
        return Err(ValidationError::Field {
            field: "storage_threshold_percent".to_string(),
            message: format!("Threshold must be within 1..=100, got {}", percent),
        });
    }
    Ok(())
}

const fn default_storage_threshold_percent() -> u8 {
    90
}

const fn default_check_interval() -> Duration {
    Duration::from_secs(15 * 60)
}

const fn default_liveness_timeout() -> Duration {
    Duration::from_secs(10)
}
