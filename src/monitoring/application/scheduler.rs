//! One gated monitoring check per trigger invocation.

use crate::config::ClientConfig;
use crate::core::domain::{
    error::{OmvError, OmvResult},
    model::{credentials::Credentials, filesystem_stats::FilesystemStats},
};
use crate::core::infrastructure::transport::{HttpTransport, RpcTransport};
use crate::monitoring::application::settings::MonitoringSettings;
use crate::monitoring::domain::{
    alert::{Alert, Notification},
    alert_policy::{decide, offending_filesystems},
    ports::{
        CredentialStore, NetworkIdentity, NotificationSink, PeriodicTrigger, TaskCompletion,
        TriggerHandler,
    },
};
use crate::OmvClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Why a check stopped where it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    HealthAlertsDisabled,
    OffTargetNetwork,
    /// Nothing saved, or the store could not be read.
    NoCredentials,
    /// The liveness probe failed and a `ServerUnavailable` alert was sent.
    ServerUnavailable,
    /// A storage alert covering `count` filesystems was sent.
    StorageAlert { count: usize },
    /// The server is up and nothing crossed the threshold (or storage
    /// alerts are off).
    Healthy,
    /// The server is up but the storage check failed; nothing was sent.
    StorageCheckFailed,
    /// The execution window closed during the check.
    Interrupted,
}

/// Result of one scheduler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub outcome: CheckOutcome,
    pub completion: TaskCompletion,
}

/// Runs the periodic health and storage check.
///
/// Each invocation re-arms the trigger first, re-reads the settings, then
/// walks the gates in order: feature switch, network, saved credentials. Only then is the server
/// probed, and only a live server is asked about storage. Errors after the
/// gates are logged and swallowed.
pub struct MonitoringScheduler {
    settings: Arc<MonitoringSettings>,
    credentials: Arc<dyn CredentialStore>,
    notifications: Arc<dyn NotificationSink>,
    network: Arc<dyn NetworkIdentity>,
    trigger: Arc<dyn PeriodicTrigger>,
    transport: Arc<dyn RpcTransport>,
    client_config: ClientConfig,
}

impl MonitoringScheduler {
    /// Creates a scheduler that talks HTTP through its own transport.
    ///
    /// # Errors
    /// Returns `OmvError::Transport` if no HTTP client could be created.
    pub fn new(
        settings: Arc<MonitoringSettings>,
        credentials: Arc<dyn CredentialStore>,
        notifications: Arc<dyn NotificationSink>,
        network: Arc<dyn NetworkIdentity>,
        trigger: Arc<dyn PeriodicTrigger>,
    ) -> OmvResult<Self> {
        Ok(Self {
            settings,
            credentials,
            notifications,
            network,
            trigger,
            transport: Arc::new(HttpTransport::new()?),
            client_config: ClientConfig::default(),
        })
    }

    pub fn with_transport(mut self, transport: Arc<dyn RpcTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = config;
        self
    }

    /// Registers this scheduler as the trigger's handler.
    pub fn register(self: &Arc<Self>) {
        let handler: Arc<dyn TriggerHandler> = self.clone();
        self.trigger.register(handler);
    }

    /// Runs one invocation. The check is abandoned when `deadline` passes.
    ///
    /// The trigger is re-armed before anything that can wait, so an
    /// abandoned check never leaves the trigger without a next run.
    pub async fn handle_trigger(&self, deadline: Option<Instant>) -> CheckReport {
        let interval = self.settings.check_interval();
        self.trigger.schedule_next(interval);

        let report = match deadline {
            Some(deadline) => {
                match tokio::time::timeout_at(deadline, self.gated_check(interval)).await {
                    Ok(outcome) => CheckReport {
                        outcome,
                        completion: completion_at(Some(deadline)),
                    },
                    Err(_) => {
                        warn!("monitoring check interrupted by its deadline");
                        CheckReport {
                            outcome: CheckOutcome::Interrupted,
                            completion: TaskCompletion::Expired,
                        }
                    }
                }
            }
            None => CheckReport {
                outcome: self.gated_check(interval).await,
                completion: TaskCompletion::Success,
            },
        };
        info!(outcome = ?report.outcome, completion = ?report.completion, "monitoring check finished");
        report
    }

    /// Runs the gates, the probe and the storage check on freshly read settings.
    async fn gated_check(&self, armed_interval: Duration) -> CheckOutcome {
        let config = match self.settings.reload().await {
            Ok(config) => config,
            Err(error) => {
                warn!(error = %error, "settings unreadable, keeping the previous ones");
                self.settings.snapshot().await
            }
        };
        if config.check_interval != armed_interval {
            self.trigger.schedule_next(config.check_interval);
        }

        if !config.health_alerts_enabled {
            debug!("health alerts disabled, skipping check");
            return CheckOutcome::HealthAlertsDisabled;
        }
        if !self.network.is_on_target_network().await {
            debug!("not on the target network, skipping check");
            return CheckOutcome::OffTargetNetwork;
        }
        let credentials = match self.credentials.load().await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                debug!("no saved credentials, skipping check");
                return CheckOutcome::NoCredentials;
            }
            Err(error) => {
                debug!(error = %error, "credentials unavailable, skipping check");
                return CheckOutcome::NoCredentials;
            }
        };

        let alive = self.is_alive(&credentials, config.liveness_timeout).await;

        let mut outcome = CheckOutcome::Healthy;
        let mut offending = Vec::new();
        if alive && config.storage_alerts_enabled {
            match self.storage_check(&credentials).await {
                Ok(filesystems) => {
                    offending = offending_filesystems(&filesystems, config.storage_threshold_percent);
                }
                Err(error) => {
                    warn!(error = %error, "storage check failed");
                    outcome = CheckOutcome::StorageCheckFailed;
                }
            }
        }

        for alert in decide(alive, offending) {
            outcome = match &alert {
                Alert::ServerUnavailable => CheckOutcome::ServerUnavailable,
                Alert::StorageFull { filesystems } => CheckOutcome::StorageAlert {
                    count: filesystems.len(),
                },
            };
            let notification = alert.to_notification();
            info!(title = %notification.title, category = ?notification.category, "raising alert");
            self.notifications.notify(&notification);
        }
        outcome
    }

    /// Sends the fixed test notification.
    pub fn send_test_notification(&self) {
        self.notifications.notify(&Notification::test());
    }

    /// Alive iff the server answers with a status below 500 in time.
    async fn is_alive(&self, credentials: &Credentials, timeout: Duration) -> bool {
        match self.transport.probe(credentials.endpoint(), timeout).await {
            Ok(status) if status < 500 => true,
            Ok(status) => {
                warn!(endpoint = %credentials.endpoint(), status, "liveness probe failed");
                false
            }
            Err(error) => {
                warn!(endpoint = %credentials.endpoint(), error = %error, "liveness probe failed");
                false
            }
        }
    }

    /// Logs in on a fresh client and lists the mounted filesystems.
    async fn storage_check(&self, credentials: &Credentials) -> OmvResult<Vec<FilesystemStats>> {
        let client = OmvClient::builder()
            .config(self.client_config.clone())
            .transport(self.transport.clone())
            .build()?;
        client.login(credentials).await?;
        let filesystems = client.list_mounted_filesystems().await;
        client.disconnect().await;
        filesystems.map_err(OmvError::from)
    }
}

fn completion_at(deadline: Option<Instant>) -> TaskCompletion {
    match deadline {
        Some(deadline) if Instant::now() > deadline => TaskCompletion::Expired,
        _ => TaskCompletion::Success,
    }
}

#[async_trait]
impl TriggerHandler for MonitoringScheduler {
    async fn on_trigger(&self, deadline: Option<Instant>) -> TaskCompletion {
        self.handle_trigger(deadline).await.completion
    }
}
