//! Total parsers from raw RPC payloads to typed stats.
//!
//! These only see payloads of successful calls. They never fail: a missing
//! or mistyped field degrades to a default value or is skipped, so one odd
//! field cannot spoil a whole refresh.

use crate::core::domain::model::{
    cpu_stats::CpuStats, filesystem_stats::FilesystemStats, memory_stats::MemoryStats,
    system_information::SystemInformation, update_info::UpdateInfo,
};
use serde_json::Value;
use tracing::debug;

/// Reads `cpuUtilization`, defaulting to 0 and clamping into 0..=100.
pub fn parse_cpu_stats(response: &Value) -> CpuStats {
    let usage = response
        .get("cpuUtilization")
        .and_then(Value::as_f64)
        .filter(|usage| usage.is_finite())
        .unwrap_or(0.0);
    CpuStats {
        current_usage: usage.clamp(0.0, 100.0),
    }
}

/// Reads `memTotal` and `memUsed`, which the server sends as numeric strings.
pub fn parse_memory_stats(response: &Value) -> MemoryStats {
    MemoryStats {
        total_bytes: byte_count(response.get("memTotal")),
        used_bytes: byte_count(response.get("memUsed")),
    }
}

fn byte_count(field: Option<&Value>) -> u64 {
    let parsed = match field {
        Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
        Some(Value::Number(number)) => number.as_i64(),
        _ => None,
    };
    parsed.map_or(0, |bytes| bytes.max(0) as u64)
}

/// Parses the filesystem list, dropping incomplete records.
///
/// Accepts a bare array or a `{"data": [...]}` page.
pub fn parse_filesystems(response: &Value) -> Vec<FilesystemStats> {
    let records = match response {
        Value::Array(records) => records,
        Value::Object(page) => match page.get("data") {
            Some(Value::Array(records)) => records,
            _ => {
                debug!("filesystem response has no record list");
                return Vec::new();
            }
        },
        _ => {
            debug!("filesystem response is not a list");
            return Vec::new();
        }
    };

    records
        .iter()
        .filter_map(|record| {
            let parsed = parse_filesystem(record);
            if parsed.is_none() {
                debug!("skipping filesystem record with missing fields");
            }
            parsed
        })
        .collect()
}

fn parse_filesystem(record: &Value) -> Option<FilesystemStats> {
    let name = record.get("devicefile")?.as_str()?;
    let available = record.get("available")?.as_str()?;
    let used = record.get("used")?.as_str()?;
    let percentage = percentage(record.get("percentage")?)?;
    Some(FilesystemStats {
        name: name.to_string(),
        available_capacity: available.to_string(),
        used_capacity: used.to_string(),
        percentage,
    })
}

fn percentage(value: &Value) -> Option<u8> {
    let number = value.as_f64().filter(|n| n.is_finite())?;
    Some(number.round().clamp(0.0, 100.0) as u8)
}

/// Parses pending updates from either server shape.
///
/// * `Apt.getUpgraded`: `{"data": [{"package": ...}]}` or a bare array.
/// * `System.getInformation`: `{"availablePkgUpdates": n}`, count only.
pub fn parse_update_info(response: &Value) -> UpdateInfo {
    package_list(response)
        .map(UpdateInfo::from_packages)
        .or_else(|| pending_update_count(response).map(UpdateInfo::from_count))
        .unwrap_or_default()
}

fn package_list(response: &Value) -> Option<Vec<String>> {
    let records = match response {
        Value::Array(records) => records,
        Value::Object(page) => page.get("data")?.as_array()?,
        _ => return None,
    };
    Some(
        records
            .iter()
            .filter_map(|record| record.get("package").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
    )
}

fn pending_update_count(response: &Value) -> Option<usize> {
    let count = response.get("availablePkgUpdates")?;
    let count = match count {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        Value::Bool(false) => Some(0),
        _ => None,
    }?;
    usize::try_from(count).ok()
}

/// Parses `System.getInformation` as a whole.
pub fn parse_system_information(response: &Value) -> SystemInformation {
    SystemInformation {
        cpu: parse_cpu_stats(response),
        memory: parse_memory_stats(response),
        updates: pending_update_count(response).map(UpdateInfo::from_count),
    }
}
