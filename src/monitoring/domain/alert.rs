use crate::core::domain::model::filesystem_stats::FilesystemStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The liveness probe failed.
    ServerUnavailable,
    /// One or more filesystems reached the storage threshold.
    StorageFull { filesystems: Vec<FilesystemStats> },
}

/// Groups notifications so the host can route or style them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationCategory {
    ServerAlert,
    StorageAlert,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::ServerAlert => "SERVER_ALERT",
            NotificationCategory::StorageAlert => "STORAGE_ALERT",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub category: Option<NotificationCategory>,
}

impl Notification {
    /// The fixed message used to check that notifications get through.
    pub fn test() -> Self {
        Self {
            title: "Test Notification".to_string(),
            body: "Background monitoring is working correctly!".to_string(),
            category: None,
        }
    }
}

impl Alert {
    pub fn category(&self) -> NotificationCategory {
        match self {
            Alert::ServerUnavailable => NotificationCategory::ServerAlert,
            Alert::StorageFull { .. } => NotificationCategory::StorageAlert,
        }
    }

    pub fn to_notification(&self) -> Notification {
        let (title, body) = match self {
            Alert::ServerUnavailable => (
                "Server Unavailable".to_string(),
                "Your openmediavault server is not responding".to_string(),
            ),
            Alert::StorageFull { filesystems } => {
                let listing = filesystems
                    .iter()
                    .map(|fs| format!("{} ({}%)", fs.name, fs.percentage))
                    .collect::<Vec<_>>()
                    .join(", ");
                let title = if filesystems.len() == 1 {
                    "Storage Almost Full".to_string()
                } else {
                    format!("{} Filesystems Almost Full", filesystems.len())
                };
                (title, format!("Running out of space: {}", listing))
            }
        };
        Notification {
            title,
            body,
            category: Some(self.category()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs(name: &str, percentage: u8) -> FilesystemStats {
        FilesystemStats {
            name: name.to_string(),
            available_capacity: "1 GiB".to_string(),
            used_capacity: "9 GiB".to_string(),
            percentage,
        }
    }

    #[test]
    fn test_server_unavailable_notification() {
        let notification = Alert::ServerUnavailable.to_notification();
        assert_eq!(notification.title, "Server Unavailable");
        assert_eq!(notification.category, Some(NotificationCategory::ServerAlert));
    }

    #[test]
    fn test_storage_notification_lists_every_filesystem() {
        let alert = Alert::StorageFull {
            filesystems: vec![fs("/dev/sda1", 95), fs("/dev/md0", 91)],
        };
        let notification = alert.to_notification();
        assert_eq!(notification.title, "2 Filesystems Almost Full");
        assert_eq!(
            notification.body,
            "Running out of space: /dev/sda1 (95%), /dev/md0 (91%)"
        );
        assert_eq!(notification.category.unwrap().as_str(), "STORAGE_ALERT");
    }

    #[test]
    fn test_notification_has_no_category() {
        assert_eq!(Notification::test().category, None);
    }
}
