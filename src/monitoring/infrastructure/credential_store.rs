//! Credential stores: the profile (host, port, username) lives in plain
//! storage, the password only in a `SecretStore`.

use crate::core::domain::{error::OmvError, model::credentials::Credentials};
use crate::monitoring::domain::ports::{CredentialStore, SecretStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::sync::RwLock;
use tracing::debug;

/// The non-secret part of a saved login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct Profile {
    host: String,
    port: u16,
    username: String,
}

impl Profile {
    fn account(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Profile in a JSON file, password in `S`.
#[derive(Debug)]
pub struct FileCredentialStore<S: SecretStore> {
    path: PathBuf,
    secrets: S,
}

impl<S: SecretStore> FileCredentialStore<S> {
    pub fn new(path: impl Into<PathBuf>, secrets: S) -> Self {
        Self {
            path: path.into(),
            secrets,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_profile(&self) -> Result<Option<Profile>, OmvError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(OmvError::Storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            OmvError::Storage(format!("invalid profile {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl<S: SecretStore> CredentialStore for FileCredentialStore<S> {
    async fn load(&self) -> Result<Option<Credentials>, OmvError> {
        let Some(profile) = self.read_profile().await? else {
            return Ok(None);
        };
        let Some(password) = self.secrets.read(&profile.account())? else {
            debug!(account = %profile.account(), "profile without stored password");
            return Ok(None);
        };
        let credentials = Credentials::new(
            profile.host,
            &profile.port.to_string(),
            profile.username,
            password,
        )?;
        Ok(Some(credentials))
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), OmvError> {
        let profile = Profile {
            host: credentials.host().as_str().to_string(),
            port: credentials.port().get(),
            username: credentials.username().as_str().to_string(),
        };
        self.secrets
            .write(&profile.account(), credentials.password().as_str())?;

        let json = serde_json::to_vec_pretty(&profile)
            .map_err(|e| OmvError::Storage(format!("failed to encode profile: {}", e)))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                OmvError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            OmvError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), OmvError> {
        if let Some(profile) = self.read_profile().await? {
            self.secrets.delete(&profile.account())?;
        }
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(OmvError::Storage(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Reads the password from an environment variable. Nothing is ever written.
#[derive(Debug, Clone)]
pub struct EnvSecretStore {
    variable: String,
}

impl EnvSecretStore {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }

    fn current(&self) -> Option<String> {
        std::env::var(&self.variable)
            .ok()
            .filter(|value| !value.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn read(&self, _account: &str) -> Result<Option<String>, OmvError> {
        Ok(self.current())
    }

    /// Accepts the secret only if the variable already holds it.
    fn write(&self, _account: &str, secret: &str) -> Result<(), OmvError> {
        if self.current().as_deref() == Some(secret) {
            return Ok(());
        }
        Err(OmvError::Storage(format!(
            "the password is read from ${}; set it there",
            self.variable
        )))
    }

    fn delete(&self, _account: &str) -> Result<(), OmvError> {
        Ok(())
    }
}

/// Secrets kept in process memory.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn read(&self, account: &str) -> Result<Option<String>, OmvError> {
        let secrets = self.secrets.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(secrets.get(account).cloned())
    }

    fn write(&self, account: &str, secret: &str) -> Result<(), OmvError> {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.to_string(), secret.to_string());
        Ok(())
    }

    fn delete(&self, account: &str) -> Result<(), OmvError> {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(account);
        Ok(())
    }
}

/// Credentials kept in process memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials: RwLock::new(credentials),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credentials>, OmvError> {
        Ok(self.credentials.read().await.clone())
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), OmvError> {
        *self.credentials.write().await = Some(credentials.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), OmvError> {
        *self.credentials.write().await = None;
        Ok(())
    }
}
