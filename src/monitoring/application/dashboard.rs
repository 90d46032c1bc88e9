//! Foreground polling of one server: the data behind a status dashboard.

use crate::core::domain::{
    error::ClientError,
    model::{
        cpu_stats::{CpuHistory, CpuSample, CpuStats},
        filesystem_stats::FilesystemStats,
        memory_stats::MemoryStats,
        update_info::UpdateInfo,
    },
};
use crate::OmvClient;
use serde::Serialize;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

/// An interactive action on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerAction {
    ApplyUpdates,
    Shutdown,
    Reboot,
}

impl ServerAction {
    fn label(&self) -> &'static str {
        match self {
            ServerAction::ApplyUpdates => "Update",
            ServerAction::Shutdown => "Shutdown",
            ServerAction::Reboot => "Reboot",
        }
    }
}

/// The result of the last action, shown for a limited time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionStatus {
    pub action: ServerAction,
    pub message: String,
    pub is_error: bool,
    #[serde(skip)]
    recorded_at: Instant,
}

impl ActionStatus {
    pub const SUCCESS_VISIBLE_FOR: Duration = Duration::from_secs(5);
    pub const ERROR_VISIBLE_FOR: Duration = Duration::from_secs(10);

    fn new(action: ServerAction, result: &Result<(), ClientError>) -> Self {
        let (message, is_error) = match result {
            Ok(()) => (format!("{} started", action.label()), false),
            Err(error) => (format!("{} failed: {}", action.label(), error), true),
        };
        Self {
            action,
            message,
            is_error,
            recorded_at: Instant::now(),
        }
    }

    pub fn visible_for(&self) -> Duration {
        if self.is_error {
            Self::ERROR_VISIBLE_FOR
        } else {
            Self::SUCCESS_VISIBLE_FOR
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.recorded_at) < self.visible_for()
    }
}

/// Everything the dashboard shows, as of the last refresh.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub cpu: Option<CpuStats>,
    pub memory: Option<MemoryStats>,
    pub filesystems: Vec<FilesystemStats>,
    pub updates: Option<UpdateInfo>,
    pub cpu_history: Vec<CpuSample>,
    pub action_status: Option<ActionStatus>,
}

#[derive(Debug, Default)]
struct DashboardState {
    cpu: Option<CpuStats>,
    memory: Option<MemoryStats>,
    filesystems: Vec<FilesystemStats>,
    updates: Option<UpdateInfo>,
    cpu_history: CpuHistory,
    action_status: Option<ActionStatus>,
}

/// Polls one authenticated client and keeps the latest values.
///
/// A failed query keeps the previous value so one hiccup does not blank the
/// view.
#[derive(Debug)]
pub struct Dashboard {
    client: OmvClient,
    state: RwLock<DashboardState>,
}

impl Dashboard {
    pub fn new(client: OmvClient) -> Self {
        Self {
            client,
            state: RwLock::new(DashboardState::default()),
        }
    }

    pub fn client(&self) -> &OmvClient {
        &self.client
    }

    /// Queries system information, filesystems and updates concurrently.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let (system, filesystems, updates) = tokio::join!(
            self.client.system_information(),
            self.client.list_mounted_filesystems(),
            self.client.update_info()
        );

        {
            let mut state = self.state.write().await;
            match system {
                Ok(info) => {
                    state.cpu_history.record(info.cpu, SystemTime::now());
                    state.cpu = Some(info.cpu);
                    state.memory = Some(info.memory);
                }
                Err(error) => warn!(error = %error, "failed to refresh system information"),
            }
            match filesystems {
                Ok(filesystems) => state.filesystems = filesystems,
                Err(error) => warn!(error = %error, "failed to refresh filesystems"),
            }
            match updates {
                Ok(updates) => state.updates = Some(updates),
                Err(error) => warn!(error = %error, "failed to refresh update info"),
            }
        }
        self.snapshot().await
    }

    /// The current values; an expired action status is cleared.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let mut state = self.state.write().await;
        let now = Instant::now();
        if state
            .action_status
            .as_ref()
            .is_some_and(|status| !status.is_visible_at(now))
        {
            state.action_status = None;
        }
        DashboardSnapshot {
            cpu: state.cpu,
            memory: state.memory,
            filesystems: state.filesystems.clone(),
            updates: state.updates.clone(),
            cpu_history: state.cpu_history.samples().cloned().collect(),
            action_status: state.action_status.clone(),
        }
    }

    /// Installs pending updates, then re-reads what is still pending.
    pub async fn apply_updates(&self) -> ActionStatus {
        let result = self.client.apply_updates().await;
        if result.is_ok() {
            match self.client.update_info().await {
                Ok(updates) => self.state.write().await.updates = Some(updates),
                Err(error) => warn!(error = %error, "failed to re-read update info"),
            }
        }
        self.record(ServerAction::ApplyUpdates, result).await
    }

    pub async fn shutdown(&self) -> ActionStatus {
        let result = self.client.shutdown().await;
        self.record(ServerAction::Shutdown, result).await
    }

    pub async fn reboot(&self) -> ActionStatus {
        let result = self.client.reboot().await;
        self.record(ServerAction::Reboot, result).await
    }

    async fn record(&self, action: ServerAction, result: Result<(), ClientError>) -> ActionStatus {
        let status = ActionStatus::new(action, &result);
        if status.is_error {
            warn!(action = ?action, message = %status.message, "server action failed");
        } else {
            info!(action = ?action, "server action succeeded");
        }
        self.state.write().await.action_status = Some(status.clone());
        status
    }
}
