use serde::{Deserialize, Serialize};

/// Pending package updates on the host.
///
/// Depending on the server version only the count may be known, in which
/// case `package_names` is empty while `count` is not.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct UpdateInfo {
    pub available: bool,
    pub count: usize,
    pub package_names: Vec<String>,
}

impl UpdateInfo {
    /// Updates known by name.
    pub fn from_packages(package_names: Vec<String>) -> Self {
        Self {
            available: !package_names.is_empty(),
            count: package_names.len(),
            package_names,
        }
    }

    /// Updates known only by count.
    pub fn from_count(count: usize) -> Self {
        Self {
            available: count > 0,
            count,
            package_names: Vec::new(),
        }
    }
}
