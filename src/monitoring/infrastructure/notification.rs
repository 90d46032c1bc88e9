use crate::monitoring::domain::{alert::Notification, ports::NotificationSink};
use tracing::warn;

/// Emits notifications as `warn!` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, notification: &Notification) {
        let category = notification
            .category
            .map(|category| category.as_str())
            .unwrap_or("GENERAL");
        warn!(
            target: "omv_monitor::notification",
            category,
            title = %notification.title,
            "{}",
            notification.body
        );
    }
}
