use serde::{Deserialize, Serialize};

/// A mounted filesystem as reported by `FileSystemMgmt.enumerateMountedFilesystems`.
///
/// Capacities are kept exactly as the server formatted them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FilesystemStats {
    /// Device path (e.g., "/dev/sda1").
    pub name: String,
    /// Available capacity as reported by the server.
    pub available_capacity: String,
    /// Used capacity as reported by the server.
    pub used_capacity: String,
    /// Used percentage (0 to 100).
    pub percentage: u8,
}

/// How full a filesystem is, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl FilesystemStats {
    pub const WARNING_PERCENT: u8 = 75;
    pub const CRITICAL_PERCENT: u8 = 90;

    pub fn severity(&self) -> Severity {
        match self.percentage {
            p if p >= Self::CRITICAL_PERCENT => Severity::Critical,
            p if p >= Self::WARNING_PERCENT => Severity::Warning,
            _ => Severity::Normal,
        }
    }
}
