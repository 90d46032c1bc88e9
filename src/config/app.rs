use crate::config::ClientConfig;
use crate::core::domain::{error::OmvError, value_object::serde_helpers::humantime_duration};
use crate::monitoring::domain::monitoring_config::MonitoringConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration of the `omv-monitor` binary, read from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    /// JSON file holding host, port and username of the saved login.
    #[serde(default = "default_profile_file")]
    pub profile_file: PathBuf,
    /// JSON file holding the persisted monitoring settings.
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,
    /// Environment variable the password is read from.
    #[serde(default = "default_password_env")]
    pub password_env: String,
    /// Optional zxcvbn score (0-4) a password must reach before login.
    #[serde(default)]
    pub min_password_score: Option<u8>,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    /// Initial monitoring settings, used until a settings file exists.
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// How the target network is recognised.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// `host:port` of a gateway service only reachable on the home network.
    /// Without it every network counts as the target network.
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default = "default_probe_timeout", with = "humantime_duration")]
    pub probe_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            gateway: None,
            probe_timeout: default_probe_timeout(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile_file: default_profile_file(),
            settings_file: default_settings_file(),
            password_env: default_password_env(),
            min_password_score: None,
            client: ClientConfig::default(),
            network: NetworkConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl From<ConfigError> for OmvError {
    fn from(error: ConfigError) -> Self {
        OmvError::Config(error.to_string())
    }
}

impl AppConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;
        Self::from_yaml(&text, &path_display)
    }

    fn from_yaml(text: &str, path_display: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path_display.to_string(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password_env.trim().is_empty() {
            return Err(ConfigError::Validation(
                "password_env must not be empty".to_string(),
            ));
        }
        if self.min_password_score.is_some_and(|score| score > 4) {
            return Err(ConfigError::Validation(
                "min_password_score must be within 0..=4".to_string(),
            ));
        }
        if self.profile_file == self.settings_file {
            return Err(ConfigError::Validation(
                "profile_file and settings_file must differ".to_string(),
            ));
        }
        self.client
            .validate()
            .map_err(|e| ConfigError::Validation(format!("client: {}", e)))?;
        self.monitoring
            .validate()
            .map_err(|e| ConfigError::Validation(format!("monitoring: {}", e)))?;
        validate_network(&self.network)?;
        Ok(())
    }

    /// The password strength floor as a zxcvbn score.
    pub fn password_score(&self) -> Option<zxcvbn::Score> {
        self.min_password_score.map(|score| match score {
            0 => zxcvbn::Score::Zero,
            1 => zxcvbn::Score::One,
            2 => zxcvbn::Score::Two,
            3 => zxcvbn::Score::Three,
            _ => zxcvbn::Score::Four,
        })
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../../omv-monitor.yaml.example")
    }
}

fn validate_network(cfg: &NetworkConfig) -> Result<(), ConfigError> {
    if let Some(gateway) = &cfg.gateway {
        let valid = gateway
            .rsplit_once(':')
            .is_some_and(|(host, port)| !host.trim().is_empty() && port.parse::<u16>().is_ok_and(|p| p > 0));
        if !valid {
            return Err(ConfigError::Validation(format!(
                "network.gateway '{}' must be host:port",
                gateway
            )));
        }
    }
    if cfg.probe_timeout.is_zero() {
        return Err(ConfigError::Validation(
            "network.probe_timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn default_profile_file() -> PathBuf {
    PathBuf::from("./omv-monitor.profile.json")
}

fn default_settings_file() -> PathBuf {
    PathBuf::from("./omv-monitor.settings.json")
}

fn default_password_env() -> String {
    "OMV_PASSWORD".to_string()
}

const fn default_probe_timeout() -> Duration {
    Duration::from_secs(2)
}
