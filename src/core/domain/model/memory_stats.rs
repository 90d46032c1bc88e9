use serde::{Deserialize, Serialize};

const BYTES_PER_GIB: f64 = 1_073_741_824.0;

/// Memory usage of the host in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct MemoryStats {
    /// Total memory in bytes.
    pub total_bytes: u64,
    /// Used memory in bytes.
    pub used_bytes: u64,
}

impl MemoryStats {
    /// Used memory as a percentage of the total, 0 when the total is unknown.
    pub fn used_percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.total_bytes as f64 * 100.0
    }

    /// Total memory in GiB.
    pub fn total_gb(&self) -> f64 {
        self.total_bytes as f64 / BYTES_PER_GIB
    }

    /// Used memory in GiB.
    pub fn used_gb(&self) -> f64 {
        self.used_bytes as f64 / BYTES_PER_GIB
    }
}
