//! Capabilities the host platform provides to the monitoring core.

use crate::core::domain::{error::OmvError, model::credentials::Credentials};
use crate::monitoring::domain::alert::Notification;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Where the saved login lives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns `None` when nothing is saved.
    async fn load(&self) -> Result<Option<Credentials>, OmvError>;
    async fn save(&self, credentials: &Credentials) -> Result<(), OmvError>;
    /// Succeeds when nothing is saved.
    async fn clear(&self) -> Result<(), OmvError>;
}

/// Storage with at-rest protection for the password, keyed by account.
#[cfg_attr(test, mockall::automock)]
pub trait SecretStore: Send + Sync {
    fn read(&self, account: &str) -> Result<Option<String>, OmvError>;
    fn write(&self, account: &str, secret: &str) -> Result<(), OmvError>;
    fn delete(&self, account: &str) -> Result<(), OmvError>;
}

/// Shows a notification to the user. Delivery is not guaranteed.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Tells whether the device is on the network the server lives on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkIdentity: Send + Sync {
    async fn is_on_target_network(&self) -> bool;
}

/// How a triggered run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCompletion {
    Success,
    /// The execution window closed before the run finished.
    Expired,
}

/// Work run by a `PeriodicTrigger`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TriggerHandler: Send + Sync {
    /// `deadline` is the end of the execution window granted by the host, if any.
    async fn on_trigger(&self, deadline: Option<Instant>) -> TaskCompletion;
}

/// An imprecise one-shot timer. A scheduled run may start late or never.
#[cfg_attr(test, mockall::automock)]
pub trait PeriodicTrigger: Send + Sync {
    /// Sets the handler run when the trigger fires.
    fn register(&self, handler: Arc<dyn TriggerHandler>);
    /// Replaces any pending run with one no earlier than `after` from now.
    fn schedule_next(&self, after: Duration);
    /// Drops the pending run, if any.
    fn cancel(&self);
}
