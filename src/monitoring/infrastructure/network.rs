use crate::monitoring::domain::ports::NetworkIdentity;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;
use tracing::debug;

/// A fixed answer, for hosts that always (or never) share the server's network.
#[derive(Debug, Clone, Copy)]
pub struct StaticNetworkIdentity(pub bool);

#[async_trait]
impl NetworkIdentity for StaticNetworkIdentity {
    async fn is_on_target_network(&self) -> bool {
        self.0
    }
}

/// On the target network iff `address` accepts a TCP connection within `timeout`.
#[derive(Debug, Clone)]
pub struct TcpGatewayIdentity {
    address: String,
    timeout: Duration,
}

impl TcpGatewayIdentity {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }
}

#[async_trait]
impl NetworkIdentity for TcpGatewayIdentity {
    async fn is_on_target_network(&self) -> bool {
        match time::timeout(self.timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(err)) => {
                debug!(address = %self.address, error = %err, "gateway unreachable");
                false
            }
            Err(_) => {
                debug!(address = %self.address, "gateway probe timeout");
                false
            }
        }
    }
}
