// Live resource usage snapshot for one container

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerStats {
    pub cpu_percent: f64,
    pub memory_usage: u64,
    pub memory_limit: u64,
    pub memory_percent: f64,
    #[serde(default)]
    pub network_rx: u64,
    #[serde(default)]
    pub network_tx: u64,
    #[serde(default)]
    pub block_read: u64,
    #[serde(default)]
    pub block_write: u64,
}

impl ContainerStats {
    /// Memory percent of limit; 0 when the limit is unknown.
    pub fn memory_percent_of(usage: u64, limit: u64) -> f64 {
        if limit == 0 {
            0.0
        } else {
            usage as f64 / limit as f64 * 100.0
        }
    }
}
