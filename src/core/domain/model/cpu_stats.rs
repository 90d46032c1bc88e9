//! CPU utilisation and its bounded display history.

use crate::core::domain::value_object::serde_helpers::system_time_millis;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::SystemTime;

/// Current CPU utilisation of the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct CpuStats {
    /// Utilisation percentage (0.0 to 100.0).
    pub current_usage: f64,
}

/// One point of the CPU history.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CpuSample {
    #[serde(with = "system_time_millis")]
    pub timestamp: SystemTime,
    pub usage: f64,
}

/// Fixed capacity FIFO of CPU samples kept by the caller for charting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CpuHistory {
    samples: VecDeque<CpuSample>,
}

impl CpuHistory {
    /// Maximum number of samples kept; the oldest is evicted first.
    pub const CAPACITY: usize = 60;

    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    /// Appends a sample, evicting the oldest one when full.
    pub fn push(&mut self, sample: CpuSample) {
        if self.samples.len() == Self::CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Appends the reading in `stats` taken at `timestamp`.
    pub fn record(&mut self, stats: CpuStats, timestamp: SystemTime) {
        self.push(CpuSample {
            timestamp,
            usage: stats.current_usage,
        });
    }

    /// Samples from oldest to newest.
    pub fn samples(&self) -> impl Iterator<Item = &CpuSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&CpuSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
