// keydeck Feature Flags
// Typed application switches with a documented default table. Values are
// merged as defaults < stored < initial < configuration overlay, persisted
// in the key-value area, and published to subscribers on every change.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::database::KeyValueStore;
use crate::types::errors::{FlagError, StorageError};
use crate::types::settings::{FeatureFlag, FeatureFlags, ThemeMode};

/// Entry under which the flag table is persisted.
pub const FLAGS_ENTRY: &str = "feature-flags";

/// Prefix marking a flag assignment in an overlay query string.
pub const OVERLAY_PREFIX: &str = "ff.";

/// Trait defining the feature flag interface.
pub trait FeatureFlagServiceTrait {
    fn init(&self, initial: Option<&Map<String, Value>>, overlay: Option<&str>) -> Result<FeatureFlags, FlagError>;
    fn get_all(&self) -> FeatureFlags;
    fn is_enabled(&self, flag: FeatureFlag) -> bool;
    fn set(&self, patch: &Map<String, Value>) -> Result<FeatureFlags, FlagError>;
    fn set_flag(&self, flag: FeatureFlag, enabled: bool) -> Result<(), FlagError>;
    fn set_default_theme(&self, theme: ThemeMode) -> Result<(), FlagError>;
    fn subscribe(&self) -> watch::Receiver<FeatureFlags>;
}

pub struct FeatureFlagService {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
    flags: watch::Sender<FeatureFlags>,
}

impl FeatureFlagService {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        let (flags, _) = watch::channel(FeatureFlags::default());
        Self {
            kv,
            namespace: namespace.into(),
            flags,
        }
    }

    /// Reads the stored table as a JSON object. An unreadable or ill-typed
    /// blob is ignored so the console still starts with defaults.
    fn read_stored(&self) -> Result<Option<Map<String, Value>>, FlagError> {
        let Some(raw) = self.kv.get(&self.namespace, FLAGS_ENTRY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) | Err(_) => {
                warn!("stored feature flags are unreadable, using defaults");
                Ok(None)
            }
        }
    }

    fn persist_and_publish(&self, flags: FeatureFlags) -> Result<FeatureFlags, FlagError> {
        let raw = serde_json::to_string(&flags).map_err(StorageError::from)?;
        self.kv.set(&self.namespace, FLAGS_ENTRY, &raw)?;
        self.flags.send_replace(flags.clone());
        Ok(flags)
    }
}

impl FeatureFlagServiceTrait for FeatureFlagService {
    fn init(&self, initial: Option<&Map<String, Value>>, overlay: Option<&str>) -> Result<FeatureFlags, FlagError> {
        let mut table = to_table(&FeatureFlags::default())?;

        if let Some(stored) = self.read_stored()? {
            let mut candidate = table.clone();
            merge_into(&mut candidate, &stored, "storage");
            match from_table(&candidate) {
                Ok(_) => table = candidate,
                Err(err) => warn!(error = %err, "stored feature flags rejected, using defaults"),
            }
        }
        if let Some(initial) = initial {
            merge_into(&mut table, initial, "initial");
        }
        if let Some(query) = overlay {
            let overrides = parse_overlay(query);
            if !overrides.is_empty() {
                debug!(count = overrides.len(), "applying feature flag overlay");
                merge_into(&mut table, &overrides, "overlay");
            }
        }

        let flags = from_table(&table)?;
        self.persist_and_publish(flags)
    }

    fn get_all(&self) -> FeatureFlags {
        self.flags.borrow().clone()
    }

    fn is_enabled(&self, flag: FeatureFlag) -> bool {
        self.flags.borrow().is_enabled(flag)
    }

    /// Merges a partial table. The whole patch is rejected if any value has
    /// the wrong type.
    fn set(&self, patch: &Map<String, Value>) -> Result<FeatureFlags, FlagError> {
        let mut table = to_table(&self.get_all())?;
        merge_into(&mut table, patch, "patch");
        let flags = from_table(&table)?;
        self.persist_and_publish(flags)
    }

    fn set_flag(&self, flag: FeatureFlag, enabled: bool) -> Result<(), FlagError> {
        let mut flags = self.get_all();
        flags.set_enabled(flag, enabled);
        self.persist_and_publish(flags)?;
        Ok(())
    }

    fn set_default_theme(&self, theme: ThemeMode) -> Result<(), FlagError> {
        let mut flags = self.get_all();
        flags.default_theme = theme;
        self.persist_and_publish(flags)?;
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<FeatureFlags> {
        self.flags.subscribe()
    }
}

/// Extracts `ff.` assignments from a query string such as
/// `?ff.enableCopy=false&ff.default_theme=dark`.
///
/// Keys are normalised to camelCase; `true`/`false` become booleans and
/// every other value stays a string. A bare `ff.flag` means `true`.
pub fn parse_overlay(query: &str) -> Map<String, Value> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut out = Map::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, "true"));
        let Some(name) = key.strip_prefix(OVERLAY_PREFIX) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let value = match value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        out.insert(camel_case(name), value);
    }
    out
}

/// `enable_dark_mode` -> `enableDarkMode`. camelCase input passes through.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn to_table(flags: &FeatureFlags) -> Result<Map<String, Value>, FlagError> {
    match serde_json::to_value(flags) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FlagError::InvalidValue("flag table is not an object".to_string())),
        Err(e) => Err(FlagError::InvalidValue(e.to_string())),
    }
}

fn from_table(table: &Map<String, Value>) -> Result<FeatureFlags, FlagError> {
    serde_json::from_value(Value::Object(table.clone())).map_err(|e| FlagError::InvalidValue(e.to_string()))
}

fn merge_into(table: &mut Map<String, Value>, patch: &Map<String, Value>, source: &str) {
    for (key, value) in patch {
        let key = camel_case(key);
        match table.get_mut(&key) {
            Some(slot) => *slot = value.clone(),
            None => warn!(key = %key, source, "ignoring unknown feature flag"),
        }
    }
}
