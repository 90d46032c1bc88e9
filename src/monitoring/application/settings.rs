use crate::core::domain::error::{OmvError, OmvResult};
use crate::monitoring::domain::{
    monitoring_config::{MonitoringConfig, validate_threshold},
    ports::PeriodicTrigger,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// The monitoring switches, optionally persisted as JSON.
///
/// Every mutation is written through before it returns.
#[derive(Debug)]
pub struct MonitoringSettings {
    config: RwLock<MonitoringConfig>,
    path: Option<PathBuf>,
}

impl MonitoringSettings {
    /// Settings that live only as long as the process.
    pub fn in_memory(config: MonitoringConfig) -> Self {
        Self {
            config: RwLock::new(config),
            path: None,
        }
    }

    /// Reads `path`, falling back to `defaults` when the file does not exist.
    ///
    /// # Errors
    /// Returns `OmvError::Storage` if the file exists but cannot be read or
    /// parsed, and `OmvError::Validation` for out-of-range values.
    pub async fn load(path: impl AsRef<Path>, defaults: MonitoringConfig) -> OmvResult<Self> {
        let path = path.as_ref().to_path_buf();
        let config = match read_config(&path).await? {
            Some(config) => config,
            None => {
                debug!(path = %path.display(), "no settings file, using defaults");
                defaults.validate()?;
                defaults
            }
        };

        Ok(Self {
            config: RwLock::new(config),
            path: Some(path),
        })
    }

    pub async fn snapshot(&self) -> MonitoringConfig {
        self.config.read().await.clone()
    }

    /// The current check interval, or the default one while a writer holds
    /// the settings. Never waits.
    pub fn check_interval(&self) -> Duration {
        self.config
            .try_read()
            .map(|config| config.check_interval)
            .unwrap_or_else(|_| MonitoringConfig::default().check_interval)
    }

    /// Re-reads the backing file so changes made by another process take
    /// effect. A missing file keeps the current settings.
    ///
    /// # Errors
    /// Returns `OmvError::Storage` or `OmvError::Validation` if the file is
    /// unreadable or invalid; the current settings are left untouched.
    pub async fn reload(&self) -> OmvResult<MonitoringConfig> {
        let Some(path) = &self.path else {
            return Ok(self.snapshot().await);
        };
        let Some(config) = read_config(path).await? else {
            return Ok(self.snapshot().await);
        };
        *self.config.write().await = config.clone();
        Ok(config)
    }

    #[cfg(test)]
    pub(crate) async fn hold(&self) -> tokio::sync::RwLockWriteGuard<'_, MonitoringConfig> {
        self.config.write().await
    }

    pub async fn enable_health_alerts(&self) -> OmvResult<MonitoringConfig> {
        self.update(|config| config.health_alerts_enabled = true)
            .await
    }

    pub async fn disable_health_alerts(&self) -> OmvResult<MonitoringConfig> {
        self.update(|config| config.health_alerts_enabled = false)
            .await
    }

    /// Turns storage alerts on with the given threshold (1..=100).
    pub async fn enable_storage_alerts(&self, threshold_percent: u8) -> OmvResult<MonitoringConfig> {
        validate_threshold(threshold_percent)?;
        self.update(|config| {
            config.storage_alerts_enabled = true;
            config.storage_threshold_percent = threshold_percent;
        })
        .await
    }

    pub async fn disable_storage_alerts(&self) -> OmvResult<MonitoringConfig> {
        self.update(|config| config.storage_alerts_enabled = false)
            .await
    }

    async fn update(&self, mutate: impl FnOnce(&mut MonitoringConfig)) -> OmvResult<MonitoringConfig> {
        let mut config = self.config.write().await;
        let mut updated = config.clone();
        mutate(&mut updated);
        self.persist(&updated).await?;
        *config = updated.clone();
        Ok(updated)
    }

    async fn persist(&self, config: &MonitoringConfig) -> OmvResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(config)
            .map_err(|e| OmvError::Storage(format!("failed to encode settings: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                OmvError::Storage(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        tokio::fs::write(path, json)
            .await
            .map_err(|e| OmvError::Storage(format!("failed to write {}: {}", path.display(), e)))
    }
}

/// Reads and validates a settings file; `None` if it does not exist.
async fn read_config(path: &Path) -> OmvResult<Option<MonitoringConfig>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(OmvError::Storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };
    let config = serde_json::from_slice::<MonitoringConfig>(&bytes).map_err(|e| {
        OmvError::Storage(format!("invalid settings file {}: {}", path.display(), e))
    })?;
    config.validate()?;
    Ok(Some(config))
}

/// Couples the settings to the trigger: enabling health alerts arms it,
/// disabling cancels it.
pub struct MonitoringService {
    settings: Arc<MonitoringSettings>,
    trigger: Arc<dyn PeriodicTrigger>,
}

impl MonitoringService {
    pub fn new(settings: Arc<MonitoringSettings>, trigger: Arc<dyn PeriodicTrigger>) -> Self {
        Self { settings, trigger }
    }

    pub fn settings(&self) -> &Arc<MonitoringSettings> {
        &self.settings
    }

    pub async fn enable_health_alerts(&self) -> OmvResult<MonitoringConfig> {
        let config = self.settings.enable_health_alerts().await?;
        self.trigger.schedule_next(config.check_interval);
        info!(interval = ?config.check_interval, "health alerts enabled");
        Ok(config)
    }

    pub async fn disable_health_alerts(&self) -> OmvResult<MonitoringConfig> {
        let config = self.settings.disable_health_alerts().await?;
        self.trigger.cancel();
        info!("health alerts disabled");
        Ok(config)
    }

    pub async fn enable_storage_alerts(&self, threshold_percent: u8) -> OmvResult<MonitoringConfig> {
        let config = self.settings.enable_storage_alerts(threshold_percent).await?;
        info!(threshold = threshold_percent, "storage alerts enabled");
        Ok(config)
    }

    pub async fn disable_storage_alerts(&self) -> OmvResult<MonitoringConfig> {
        let config = self.settings.disable_storage_alerts().await?;
        info!("storage alerts disabled");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::domain::ports::MockPeriodicTrigger;
    use mockall::predicate::eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let settings = MonitoringSettings::load(dir.path().join("settings.json"), MonitoringConfig::default())
            .await
            .unwrap();
        assert_eq!(settings.snapshot().await, MonitoringConfig::default());
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = MonitoringSettings::load(&path, MonitoringConfig::default())
            .await
            .unwrap();
        settings.enable_health_alerts().await.unwrap();
        settings.enable_storage_alerts(80).await.unwrap();

        let reloaded = MonitoringSettings::load(&path, MonitoringConfig::default())
            .await
            .unwrap()
            .snapshot()
            .await;
        assert!(reloaded.health_alerts_enabled);
        assert!(reloaded.storage_alerts_enabled);
        assert_eq!(reloaded.storage_threshold_percent, 80);
    }

    #[tokio::test]
    async fn test_invalid_threshold_changes_nothing() {
        let settings = MonitoringSettings::in_memory(MonitoringConfig::default());
        assert!(matches!(
            settings.enable_storage_alerts(0).await,
            Err(OmvError::Validation(_))
        ));
        assert!(settings.enable_storage_alerts(101).await.is_err());
        assert_eq!(settings.snapshot().await, MonitoringConfig::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let result = MonitoringSettings::load(&path, MonitoringConfig::default()).await;
        assert!(matches!(result, Err(OmvError::Storage(_))));
    }

    #[tokio::test]
    async fn test_enabling_health_alerts_arms_trigger() {
        let mut trigger = MockPeriodicTrigger::new();
        trigger
            .expect_schedule_next()
            .with(eq(Duration::from_secs(900)))
            .times(1)
            .return_const(());
        trigger.expect_cancel().never();

        let service = MonitoringService::new(
            Arc::new(MonitoringSettings::in_memory(MonitoringConfig::default())),
            Arc::new(trigger),
        );
        let config = service.enable_health_alerts().await.unwrap();
        assert!(config.health_alerts_enabled);
    }

    #[tokio::test]
    async fn test_disabling_health_alerts_cancels_trigger() {
        let mut trigger = MockPeriodicTrigger::new();
        trigger.expect_schedule_next().never();
        trigger.expect_cancel().times(1).return_const(());

        let service = MonitoringService::new(
            Arc::new(MonitoringSettings::in_memory(MonitoringConfig {
                health_alerts_enabled: true,
                ..Default::default()
            })),
            Arc::new(trigger),
        );
        let config = service.disable_health_alerts().await.unwrap();
        assert!(!config.health_alerts_enabled);
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes_from_another_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let watcher = MonitoringSettings::load(&path, MonitoringConfig::default())
            .await
            .unwrap();
        let editor = MonitoringSettings::load(&path, MonitoringConfig::default())
            .await
            .unwrap();

        editor.enable_health_alerts().await.unwrap();
        assert!(!watcher.snapshot().await.health_alerts_enabled);
        assert!(watcher.reload().await.unwrap().health_alerts_enabled);
        assert!(watcher.snapshot().await.health_alerts_enabled);

        tokio::fs::write(&path, b"{broken").await.unwrap();
        assert!(matches!(watcher.reload().await, Err(OmvError::Storage(_))));
        assert!(watcher.snapshot().await.health_alerts_enabled);
    }

    #[tokio::test]
    async fn test_check_interval_does_not_wait_for_writers() {
        let settings = MonitoringSettings::in_memory(MonitoringConfig {
            check_interval: Duration::from_secs(60),
            ..Default::default()
        });
        assert_eq!(settings.check_interval(), Duration::from_secs(60));

        let _held = settings.hold().await;
        assert_eq!(settings.check_interval(), Duration::from_secs(900));
    }
}
