//! App Core for keydeck.
//!
//! Composition root: builds every service around one injected key-value area
//! and owns them for the lifetime of the console. Nothing in the crate keeps
//! module-level state.

use std::sync::Arc;

use tracing::info;

use crate::database::{Database, KeyValueStore, MemoryKvStore, SqliteKvStore};
use crate::managers::key_manager::{KeyManager, LoadOutcome};
use crate::managers::session_manager::{SessionManager, SessionManagerTrait};
use crate::platform;
use crate::services::credential_store::{CredentialStore, StoreOptions};
use crate::services::encryption_service::EncryptionService;
use crate::services::feature_flags::{FeatureFlagService, FeatureFlagServiceTrait};
use crate::services::latency::Latency;
use crate::services::preferences::PreferencesService;
use crate::services::usage_stats::UsageStatsService;
use crate::types::errors::{AppError, StorageError};
use crate::types::settings::ConsoleSettings;

/// Central application struct holding all managers and services.
pub struct App {
    pub settings: ConsoleSettings,
    pub kv: Arc<dyn KeyValueStore>,
    pub keys: KeyManager,
    pub flags: FeatureFlagService,
    pub preferences: PreferencesService,
    pub sessions: SessionManager,
    pub stats: UsageStatsService,
}

/// What `startup` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub keys_loaded: usize,
    pub expired_session_cleared: bool,
}

impl App {
    /// Wires every service against `kv`.
    pub fn new(settings: ConsoleSettings, kv: Arc<dyn KeyValueStore>) -> Self {
        let namespace = settings.storage.namespace.clone();
        let encryption = EncryptionService::from_settings(&settings.latency);
        let store = CredentialStore::new(kv.clone(), encryption, StoreOptions::from_settings(&settings));
        let stats_latency = Latency::from_millis(settings.latency.stats_ms, settings.latency.jitter_ms);

        Self {
            keys: KeyManager::new(Arc::new(store)),
            flags: FeatureFlagService::new(kv.clone(), namespace.clone()),
            preferences: PreferencesService::new(kv.clone(), namespace.clone()).with_system_locale(),
            sessions: SessionManager::new(kv.clone(), namespace.clone()),
            stats: UsageStatsService::new(kv.clone(), namespace, stats_latency),
            settings,
            kv,
        }
    }

    /// Opens the SQLite database named in the settings.
    pub fn open(settings: ConsoleSettings) -> Result<Self, AppError> {
        let path = platform::database_path(&settings.storage.database_file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }
        let db = Database::open(&path).map_err(StorageError::from)?;
        info!(path = %path.display(), "opened key database");
        Ok(Self::new(settings, Arc::new(SqliteKvStore::new(Arc::new(db)))))
    }

    /// Console backed by process memory only.
    pub fn in_memory(settings: ConsoleSettings) -> Self {
        Self::new(settings, Arc::new(MemoryKvStore::new()))
    }

    /// Startup sequence: apply flags with the overlay, drop an expired
    /// session, then load the key collection.
    pub async fn startup(&self, overlay: Option<&str>) -> Result<StartupReport, AppError> {
        self.flags.init(None, overlay)?;
        let expired_session_cleared = self.sessions.purge_expired()?;
        let keys_loaded = match self.keys.load().await? {
            LoadOutcome::Applied(count) => count,
            LoadOutcome::Superseded => self.keys.state().items.len(),
        };
        info!(keys_loaded, "console ready");
        Ok(StartupReport {
            keys_loaded,
            expired_session_cleared,
        })
    }
}
