//! Credential Store for keydeck.
//!
//! Persists the full ordered credential collection as one JSON value in the
//! local key-value area. Every operation suspends for a simulated round-trip
//! before touching storage, and every read-modify-write runs under a single
//! FIFO write lock so concurrent mutations of different records never clobber
//! each other.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::KeyValueStore;
use crate::services::checksum::{self, generate_secret, looks_unmasked, mask_secret, validate_format};
use crate::services::encryption_service::{encode_payload, EncryptionService};
use crate::services::latency::Latency;
use crate::types::credential::{
    Credential, CredentialPatch, IssuedCredential, NewCredential, RevealedSecret, VISIBLE_PREFIX_LEN,
};
use crate::types::errors::{KeyError, RevealError, StorageError};
use crate::types::settings::{ConsoleSettings, LatencySettings};

/// Entry under which the serialized collection lives.
pub const KEYS_ENTRY: &str = "keys";

/// Simulated round-trip per store operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreLatency {
    pub list: Latency,
    pub create: Latency,
    pub update: Latency,
    pub revoke: Latency,
    pub delete: Latency,
    pub regenerate: Latency,
    pub decrypt: Latency,
}

impl StoreLatency {
    pub fn from_settings(latency: &LatencySettings) -> Self {
        let of = |ms| Latency::from_millis(ms, latency.jitter_ms);
        Self {
            list: of(latency.list_ms),
            create: of(latency.create_ms),
            update: of(latency.update_ms),
            revoke: of(latency.revoke_ms),
            delete: of(latency.delete_ms),
            regenerate: of(latency.regenerate_ms),
            decrypt: of(latency.decrypt_ms),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub namespace: String,
    pub secret_length: usize,
    pub default_read_scopes: BTreeSet<String>,
    pub write_implies_read: bool,
    pub latency: StoreLatency,
}

impl StoreOptions {
    pub fn from_settings(settings: &ConsoleSettings) -> Self {
        Self {
            namespace: settings.storage.namespace.clone(),
            secret_length: settings.keys.secret_length,
            default_read_scopes: settings.keys.default_read_scopes.iter().cloned().collect(),
            write_implies_read: settings.keys.write_implies_read,
            latency: StoreLatency::from_settings(&settings.latency),
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from_settings(&ConsoleSettings::default())
    }
}

/// Rewrites legacy records whose display value still holds the raw secret.
///
/// A record that had no payload gets the raw value sealed into one first so
/// the secret stays recoverable. Returns the number of records changed;
/// a second pass over the output always returns zero.
pub fn migrate_legacy(records: &mut [Credential]) -> usize {
    let mut migrated = 0;
    for record in records.iter_mut().filter(|r| looks_unmasked(&r.display_value)) {
        if record.encrypted_payload.is_none() {
            record.encrypted_payload = Some(encode_payload(&record.display_value));
            record.encryption_metadata = Some(EncryptionService::instant().metadata_for(&record.display_value));
        }
        record.display_value = mask_secret(&record.display_value);
        migrated += 1;
    }
    migrated
}

/// Persistence adapter between the key manager and the key-value area.
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
    encryption: EncryptionService,
    options: StoreOptions,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, encryption: EncryptionService, options: StoreOptions) -> Self {
        Self {
            kv,
            encryption,
            options,
            write_lock: Mutex::new(()),
        }
    }

    pub fn encryption(&self) -> &EncryptionService {
        &self.encryption
    }

    /// Reads the full collection, applying and persisting the legacy migration
    /// when it changed anything.
    pub async fn list_all(&self) -> Result<Vec<Credential>, KeyError> {
        self.options.latency.list.wait().await;
        let _guard = self.write_lock.lock().await;

        let mut records = self.read_raw()?;
        let migrated = migrate_legacy(&mut records);
        if migrated > 0 {
            info!(count = migrated, "migrated legacy unmasked keys");
            self.write_records(&records)?;
        }
        debug!(count = records.len(), "listed keys");
        Ok(records)
    }

    /// Creates and persists a credential. The returned secret is the only
    /// copy of the plaintext the caller will ever receive.
    pub async fn create(&self, input: NewCredential) -> Result<IssuedCredential, KeyError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(KeyError::InvalidInput("title must not be blank".to_string()));
        }
        let secret = match input.secret {
            Some(supplied) => {
                if !validate_format(supplied.expose()) {
                    return Err(KeyError::InvalidInput(format!(
                        "supplied secret does not match the {}<body> format",
                        checksum::secret_prefix()
                    )));
                }
                supplied
            }
            None => RevealedSecret::new(generate_secret(self.options.secret_length)?),
        };

        self.options.latency.create.wait().await;
        let payload = self.encryption.encrypt(secret.expose()).await;

        let read_scopes = input
            .read_scopes
            .unwrap_or_else(|| self.options.default_read_scopes.clone());
        let write_scopes = input.write_scopes.unwrap_or_default();
        let mut record = Credential {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: input.description.filter(|d| !d.trim().is_empty()),
            display_value: mask_secret(secret.expose()),
            encrypted_payload: Some(payload),
            created_at: Utc::now(),
            revoked: false,
            revoked_at: None,
            read_scopes,
            write_scopes,
            last_regenerated_at: None,
            encryption_metadata: Some(self.encryption.metadata_for(secret.expose())),
        };
        self.normalize_scopes(&mut record);

        {
            let _guard = self.write_lock.lock().await;
            let mut records = self.read_records()?;
            records.insert(0, record.clone());
            self.write_records(&records)?;
        }

        info!(id = %record.id, prefix = %visible_prefix(&record), "created key");
        Ok(IssuedCredential {
            credential: record,
            secret,
        })
    }

    /// Merges `patch` into the record. `None` when the id is unknown.
    /// Revoked records stay editable.
    pub async fn update(&self, id: &str, patch: CredentialPatch) -> Result<Option<Credential>, KeyError> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(KeyError::InvalidInput("title must not be blank".to_string()));
            }
        }

        self.options.latency.update.wait().await;
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records()?;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        if let Some(title) = patch.title {
            record.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            record.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(read) = patch.read_scopes {
            record.read_scopes = read;
        }
        if let Some(write) = patch.write_scopes {
            record.write_scopes = write;
        }
        self.normalize_scopes(record);

        let updated = record.clone();
        self.write_records(&records)?;
        debug!(id = %updated.id, "updated key");
        Ok(Some(updated))
    }

    /// Marks the record revoked. Revoking twice returns the record unchanged
    /// and writes nothing.
    pub async fn revoke(&self, id: &str) -> Result<Option<Credential>, KeyError> {
        self.options.latency.revoke.wait().await;
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records()?;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if record.revoked {
            return Ok(Some(record.clone()));
        }

        record.revoked = true;
        record.revoked_at = Some(Utc::now());
        let revoked = record.clone();
        self.write_records(&records)?;
        info!(id = %revoked.id, "revoked key");
        Ok(Some(revoked))
    }

    /// Replaces the secret of a record. The payload, display value and
    /// metadata change together in a single write.
    pub async fn regenerate(&self, id: &str) -> Result<Option<IssuedCredential>, KeyError> {
        let secret = RevealedSecret::new(generate_secret(self.options.secret_length)?);
        self.options.latency.regenerate.wait().await;
        let payload = self.encryption.encrypt(secret.expose()).await;

        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records()?;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        record.display_value = mask_secret(secret.expose());
        record.encrypted_payload = Some(payload);
        record.encryption_metadata = Some(self.encryption.metadata_for(secret.expose()));
        record.last_regenerated_at = Some(Utc::now());
        let credential = record.clone();
        self.write_records(&records)?;

        info!(id = %credential.id, prefix = %visible_prefix(&credential), "regenerated key");
        Ok(Some(IssuedCredential { credential, secret }))
    }

    /// Removes the record. Unknown ids are not an error.
    pub async fn delete(&self, id: &str) -> Result<(), KeyError> {
        self.options.latency.delete.wait().await;
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() != before {
            self.write_records(&records)?;
            info!(id, "deleted key");
        }
        Ok(())
    }

    /// Decrypts the stored payload, reporting exactly why it failed.
    pub async fn reveal(&self, id: &str) -> Result<RevealedSecret, RevealError> {
        self.options.latency.decrypt.wait().await;
        let records = self.read_records()?;
        let record = records
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| RevealError::NotFound(id.to_string()))?;
        let payload = record
            .encrypted_payload
            .ok_or_else(|| RevealError::DecryptionUnavailable(id.to_string()))?;
        Ok(self.encryption.decrypt(&payload).await?)
    }

    /// [`reveal`](Self::reveal) collapsed to success or `None`.
    pub async fn decrypt(&self, id: &str) -> Option<RevealedSecret> {
        match self.reveal(id).await {
            Ok(secret) => Some(secret),
            Err(err) => {
                warn!(id, error = %err, "decrypt failed");
                None
            }
        }
    }

    fn normalize_scopes(&self, record: &mut Credential) {
        if self.options.write_implies_read {
            record.read_scopes.extend(record.write_scopes.iter().cloned());
        }
    }

    fn read_raw(&self) -> Result<Vec<Credential>, StorageError> {
        match self.kv.get(&self.options.namespace, KEYS_ENTRY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                warn!(error = %e, "stored key collection is unreadable");
                StorageError::from(e)
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Reads with the migration applied in memory. The next write persists it.
    fn read_records(&self) -> Result<Vec<Credential>, StorageError> {
        let mut records = self.read_raw()?;
        migrate_legacy(&mut records);
        Ok(records)
    }

    fn write_records(&self, records: &[Credential]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(records)?;
        self.kv.set(&self.options.namespace, KEYS_ENTRY, &raw)
    }
}

fn visible_prefix(record: &Credential) -> String {
    record.display_value.chars().take(VISIBLE_PREFIX_LEN).collect()
}
