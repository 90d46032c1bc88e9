mod auth;
pub mod config;
mod core;
pub mod monitoring;

pub use crate::config::{ClientConfig, RateLimitConfig};
pub use crate::core::application::stats_parser;
pub use crate::core::domain::error::{
    AuthError, ClientError, OmvError, OmvResult, TransportError, ValidationError,
};
pub use crate::core::domain::model::{
    cpu_stats::{CpuHistory, CpuSample, CpuStats},
    credentials::Credentials,
    filesystem_stats::{FilesystemStats, Severity},
    memory_stats::MemoryStats,
    rpc_envelope::RpcEnvelope,
    session::Session,
    system_information::SystemInformation,
    update_info::UpdateInfo,
};
pub use crate::core::domain::value_object::{
    OmvEndpoint, OmvHost, OmvPassword, OmvPort, OmvUsername, SessionToken,
};
pub use crate::core::infrastructure::transport::{HttpTransport, RpcTransport, SESSION_HEADER};

use crate::core::infrastructure::api_client::ApiClient;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A client for the openmediavault JSON-RPC API
///
/// This client provides:
/// - Login and silent session renewal when the server drops the session
/// - Typed operations for system information, filesystems and updates
/// - Power management (shutdown, reboot)
///
/// Clones share one session, so a single login serves every clone.
///
/// # Examples
///
/// ```no_run
/// use omv_monitor::{Credentials, OmvClient, OmvResult};
///
/// #[tokio::main]
/// async fn main() -> OmvResult<()> {
///     let client = OmvClient::builder()
///         .request_timeout(std::time::Duration::from_secs(5))
///         .build()?;
///
///     let credentials = Credentials::new("192.168.1.10", "80", "admin", "openmediavault")?;
///     client.login(&credentials).await?;
///
///     let info = client.system_information().await?;
///     println!("CPU: {:.1}%", info.cpu.current_usage);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct OmvClient {
    inner: Arc<ApiClient>,
}

/// Builder for OmvClient configuration
#[derive(Debug, Default)]
pub struct OmvClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn RpcTransport>>,
}

impl OmvClientBuilder {
    /// Upper bound for each RPC exchange (default 10 seconds).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Limits outgoing calls to `requests_per_second` with bursts of `burst_size`.
    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.config.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    /// Replaces the whole client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares an existing transport instead of creating a new HTTP client.
    pub fn transport(mut self, transport: Arc<dyn RpcTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    /// Returns `OmvError::Validation` for an invalid configuration and
    /// `OmvError::Transport` if no HTTP client could be created.
    pub fn build(self) -> OmvResult<OmvClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };
        Ok(OmvClient {
            inner: Arc::new(ApiClient::new(transport, self.config)?),
        })
    }
}

impl OmvClient {
    /// Creates a new builder for OmvClient configuration
    pub fn builder() -> OmvClientBuilder {
        OmvClientBuilder::default()
    }

    /// Authenticates with the server and keeps the credentials for renewal.
    ///
    /// # Errors
    ///
    /// * `AuthError::NoToken` if the server accepted the request but issued
    ///   no session id
    /// * `AuthError::Transport` for wrong credentials (reported by the server
    ///   as an RPC error), network failures and malformed replies
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, AuthError> {
        self.inner.login(credentials).await
    }

    /// Drops the session and the retained credentials. Never touches the network.
    pub async fn disconnect(&self) {
        self.inner.disconnect().await;
    }

    /// Returns true if the client holds a session token
    pub async fn is_authenticated(&self) -> bool {
        self.inner.is_authenticated().await
    }

    /// Returns a snapshot of the current session
    pub async fn session(&self) -> Session {
        self.inner.session().await
    }

    /// Executes an arbitrary authenticated call and returns its `response` member.
    pub async fn call(&self, envelope: &RpcEnvelope) -> Result<Value, ClientError> {
        self.inner.call(envelope).await
    }

    /// `System.getInformation`: CPU, memory and (on some servers) the
    /// pending update count.
    pub async fn system_information(&self) -> Result<SystemInformation, ClientError> {
        let response = self
            .call(&RpcEnvelope::new("System", "getInformation"))
            .await?;
        Ok(stats_parser::parse_system_information(&response))
    }

    /// Lists every mounted filesystem in server order.
    pub async fn list_mounted_filesystems(&self) -> Result<Vec<FilesystemStats>, ClientError> {
        let envelope = RpcEnvelope::new("FileSystemMgmt", "enumerateMountedFilesystems")
            .param("start", 0)
            .param("limit", -1);
        let response = self.call(&envelope).await?;
        Ok(stats_parser::parse_filesystems(&response))
    }

    /// `Apt.getUpgraded`: the packages with a pending upgrade.
    pub async fn upgradeable_packages(&self) -> Result<UpdateInfo, ClientError> {
        let response = self.call(&RpcEnvelope::new("Apt", "getUpgraded")).await?;
        Ok(stats_parser::parse_update_info(&response))
    }

    /// Pending updates, from the package list where the server offers it and
    /// from the count in `System.getInformation` otherwise.
    pub async fn update_info(&self) -> Result<UpdateInfo, ClientError> {
        match self.upgradeable_packages().await {
            Err(ClientError::Remote(message)) => {
                debug!(error = %message, "package list unavailable, using update count");
                let info = self.system_information().await?;
                Ok(info.updates.unwrap_or_default())
            }
            other => other,
        }
    }

    /// `Apt.upgrade`: installs all pending updates.
    pub async fn apply_updates(&self) -> Result<(), ClientError> {
        self.call(&RpcEnvelope::new("Apt", "upgrade").empty_params())
            .await?;
        info!("update started");
        Ok(())
    }

    /// `System.shutdown`
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.call(&RpcEnvelope::new("System", "shutdown").empty_params())
            .await?;
        info!("shutdown requested");
        Ok(())
    }

    /// `System.reboot`
    pub async fn reboot(&self) -> Result<(), ClientError> {
        self.call(&RpcEnvelope::new("System", "reboot").empty_params())
            .await?;
        info!("reboot requested");
        Ok(())
    }

    /// Probes `{endpoint}/rpc.php` without a session and returns the HTTP status.
    pub async fn probe(&self, endpoint: &OmvEndpoint, timeout: Duration) -> Result<u16, TransportError> {
        self.inner.transport().probe(endpoint, timeout).await
    }
}

#[cfg(test)]
mod tests;
