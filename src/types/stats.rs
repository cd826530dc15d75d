use serde::{Deserialize, Serialize};

/// Number of hourly buckets in a stats record.
pub const HOURLY_BUCKETS: usize = 24;

/// Number of daily buckets in a stats record.
pub const DAILY_BUCKETS: usize = 14;

/// Mock usage statistics for one key, or aggregated over all keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStats {
    pub total_calls: u64,
    pub total_errors: u64,
    #[serde(default)]
    pub hourly_data: Vec<u64>,
    #[serde(default, rename = "last14Days")]
    pub last_14_days: Vec<u64>,
    /// Hourly series written by older builds under a different name.
    #[serde(default, rename = "last24h", skip_serializing)]
    pub legacy_last_24h: Option<Vec<u64>>,
}

impl KeyStats {
    /// Moves a legacy hourly series into `hourly_data`. Returns true when the
    /// record changed.
    pub fn upgrade_legacy(&mut self) -> bool {
        match self.legacy_last_24h.take() {
            Some(legacy) if self.hourly_data.is_empty() => {
                self.hourly_data = legacy;
                true
            }
            _ => false,
        }
    }
}
