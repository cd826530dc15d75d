//! Mock usage statistics.
//!
//! Per-key series are generated on first request and persisted so the same
//! key keeps showing the same numbers. The aggregate view sums the stored
//! hourly series and synthesises a plausible one when nothing is stored.

use std::collections::BTreeMap;
use std::sync::Arc;

use ring::rand::{SecureRandom, SystemRandom};
use tokio::sync::Mutex;
use tracing::debug;

use crate::database::KeyValueStore;
use crate::services::latency::Latency;
use crate::types::errors::{CryptoError, StatsError, StorageError};
use crate::types::stats::{KeyStats, DAILY_BUCKETS, HOURLY_BUCKETS};

pub const STATS_ENTRY: &str = "key-stats";

/// Share of calls reported as errors, in percent.
pub const ERROR_RATE_PERCENT: u64 = 3;

type StatsTable = BTreeMap<String, KeyStats>;

pub struct UsageStatsService {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
    latency: Latency,
    rng: SystemRandom,
    write_lock: Mutex<()>,
}

impl UsageStatsService {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>, latency: Latency) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
            latency,
            rng: SystemRandom::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Stats of one key, generated and stored on first request.
    pub async fn key_stats(&self, id: &str) -> Result<KeyStats, StatsError> {
        self.latency.wait().await;
        let _guard = self.write_lock.lock().await;
        let mut table = self.read_table()?;

        if let Some(stats) = table.get_mut(id) {
            if stats.upgrade_legacy() {
                let stats = stats.clone();
                self.write_table(&table)?;
                return Ok(stats);
            }
            return Ok(stats.clone());
        }

        let hourly = self.series(HOURLY_BUCKETS, 0, 40)?;
        let daily = self.series(DAILY_BUCKETS, 10, 300)?;
        let total_calls = hourly.iter().sum::<u64>() + daily.iter().sum::<u64>();
        let stats = KeyStats {
            total_calls,
            total_errors: error_count(total_calls),
            hourly_data: hourly,
            last_14_days: daily,
            legacy_last_24h: None,
        };
        table.insert(id.to_string(), stats.clone());
        self.write_table(&table)?;
        debug!(id, total_calls, "generated usage stats");
        Ok(stats)
    }

    /// Totals over every key with stored stats.
    pub async fn aggregate(&self) -> Result<KeyStats, StatsError> {
        self.latency.wait().await;
        let _guard = self.write_lock.lock().await;
        let mut table = self.read_table()?;

        let mut upgraded = false;
        let mut total_calls = 0;
        let mut total_errors = 0;
        let mut hourly = vec![0u64; HOURLY_BUCKETS];
        for stats in table.values_mut() {
            upgraded |= stats.upgrade_legacy();
            total_calls += stats.total_calls;
            total_errors += stats.total_errors;
            for (slot, value) in hourly.iter_mut().zip(&stats.hourly_data) {
                *slot += value;
            }
        }
        if upgraded {
            self.write_table(&table)?;
        }

        if total_calls == 0 {
            hourly = self.series(HOURLY_BUCKETS, 10, 100)?;
            total_calls = hourly.iter().sum();
            total_errors = error_count(total_calls);
        }

        Ok(KeyStats {
            total_calls,
            total_errors,
            hourly_data: hourly,
            last_14_days: self.series(DAILY_BUCKETS, 100, 500)?,
            legacy_last_24h: None,
        })
    }

    /// Drops the stats of a deleted key.
    pub async fn forget(&self, id: &str) -> Result<(), StatsError> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.read_table()?;
        if table.remove(id).is_some() {
            self.write_table(&table)?;
        }
        Ok(())
    }

    fn series(&self, len: usize, min: u64, max: u64) -> Result<Vec<u64>, CryptoError> {
        (0..len).map(|_| self.rand_inclusive(min, max)).collect()
    }

    fn rand_inclusive(&self, min: u64, max: u64) -> Result<u64, CryptoError> {
        let mut bytes = [0u8; 8];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| CryptoError::RandomGeneration("system random source unavailable".to_string()))?;
        Ok(min + u64::from_le_bytes(bytes) % (max - min + 1))
    }

    /// Unreadable blobs read as empty: the numbers are mock data anyway.
    fn read_table(&self) -> Result<StatsTable, StorageError> {
        let raw = self.kv.get(&self.namespace, STATS_ENTRY)?;
        Ok(raw
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }

    fn write_table(&self, table: &StatsTable) -> Result<(), StorageError> {
        let raw = serde_json::to_string(table)?;
        self.kv.set(&self.namespace, STATS_ENTRY, &raw)
    }
}

fn error_count(total_calls: u64) -> u64 {
    total_calls * ERROR_RATE_PERCENT / 100
}
