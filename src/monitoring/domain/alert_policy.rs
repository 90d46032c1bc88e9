//! Pure alert decisions, independent of any I/O.

use crate::core::domain::model::filesystem_stats::FilesystemStats;
use crate::monitoring::domain::alert::Alert;

/// Keeps the filesystems at or above `threshold_percent`, in input order.
pub fn offending_filesystems(
    filesystems: &[FilesystemStats],
    threshold_percent: u8,
) -> Vec<FilesystemStats> {
    filesystems
        .iter()
        .filter(|fs| fs.percentage >= threshold_percent)
        .cloned()
        .collect()
}

/// Decides which alerts one check raises.
///
/// An unreachable server yields exactly one `ServerUnavailable` and storage
/// is not looked at. Otherwise all offenders are folded into a single
/// `StorageFull`.
pub fn decide(alive: bool, offending: Vec<FilesystemStats>) -> Vec<Alert> {
    if !alive {
        return vec![Alert::ServerUnavailable];
    }
    if offending.is_empty() {
        return Vec::new();
    }
    vec![Alert::StorageFull {
        filesystems: offending,
    }]
}
