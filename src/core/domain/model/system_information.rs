use crate::core::domain::model::{
    cpu_stats::CpuStats, memory_stats::MemoryStats, update_info::UpdateInfo,
};
use serde::{Deserialize, Serialize};

/// The parsed result of `System.getInformation`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct SystemInformation {
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    /// Present only on servers that fold the pending update count into the
    /// system information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<UpdateInfo>,
}
