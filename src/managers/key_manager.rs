//! Key lifecycle manager for keydeck.
//!
//! Owns the in-memory view of the credential collection and brackets every
//! store call with the loading flag. Subscribers observe each transition
//! through a `watch` channel.
//!
//! Two guards keep concurrent use coherent:
//! - at most one mutating call per key id is outstanding; a second one is
//!   rejected with [`KeyError::Busy`];
//! - a `load` that was overtaken by a newer `load` is discarded, and
//!   mutations applied while a load was in flight are replayed onto its
//!   result so acknowledged changes are never rolled back.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::services::credential_store::CredentialStore;
use crate::services::encryption_service::SchemeInfo;
use crate::types::credential::{Credential, CredentialPatch, IssuedCredential, NewCredential, RevealedSecret};
use crate::types::errors::{KeyError, RevealError};

/// Snapshot published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeysState {
    pub is_loading: bool,
    /// Most recent first.
    pub items: Vec<Credential>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced; carries the new item count.
    Applied(usize),
    /// A newer load was issued before this one completed.
    Superseded,
}

#[derive(Debug, Clone)]
enum Mutation {
    Prepend(Credential),
    Replace(Credential),
    Remove(String),
}

impl Mutation {
    fn apply_to(&self, items: &mut Vec<Credential>) -> bool {
        match self {
            Mutation::Prepend(record) => {
                items.retain(|r| r.id != record.id);
                items.insert(0, record.clone());
                true
            }
            Mutation::Replace(record) => match items.iter_mut().find(|r| r.id == record.id) {
                Some(slot) => {
                    *slot = record.clone();
                    true
                }
                None => false,
            },
            Mutation::Remove(id) => {
                let before = items.len();
                items.retain(|r| &r.id != id);
                items.len() != before
            }
        }
    }
}

#[derive(Default)]
struct Control {
    /// Bracketed operations currently outstanding.
    pending: usize,
    busy: HashSet<String>,
    revision: u64,
    load_seq: u64,
    loads_in_flight: usize,
    /// Mutations applied while at least one load was in flight.
    journal: Vec<Mutation>,
}

struct Inner {
    store: Arc<CredentialStore>,
    state: watch::Sender<KeysState>,
    control: Mutex<Control>,
}

impl Inner {
    fn control(&self) -> MutexGuard<'_, Control> {
        // Plain counters: safe to keep using after a poisoning panic.
        self.control.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keeps `is_loading` raised while alive.
struct LoadingGuard {
    inner: Arc<Inner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut control = self.inner.control();
        control.pending = control.pending.saturating_sub(1);
        if control.pending == 0 {
            self.inner.state.send_modify(|s| s.is_loading = false);
        }
    }
}

/// Marks one key id as having a mutation in flight.
struct BusyGuard {
    inner: Arc<Inner>,
    id: String,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.control().busy.remove(&self.id);
    }
}

/// Handle to the process-wide key state. Clones share the same state.
#[derive(Clone)]
pub struct KeyManager {
    inner: Arc<Inner>,
}

impl KeyManager {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        let (state, _) = watch::channel(KeysState::default());
        Self {
            inner: Arc::new(Inner {
                store,
                state,
                control: Mutex::new(Control::default()),
            }),
        }
    }

    pub fn state(&self) -> KeysState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<KeysState> {
        self.inner.state.subscribe()
    }

    /// Number of changes applied to the collection so far.
    pub fn revision(&self) -> u64 {
        self.inner.control().revision
    }

    pub fn describe_scheme(&self) -> SchemeInfo {
        self.inner.store.encryption().describe_scheme()
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.inner.control().busy.contains(id)
    }

    /// Replaces the collection with the stored one.
    pub async fn load(&self) -> Result<LoadOutcome, KeyError> {
        let _loading = self.begin_loading();
        let (seq, mark) = {
            let mut control = self.inner.control();
            control.load_seq += 1;
            control.loads_in_flight += 1;
            (control.load_seq, control.journal.len())
        };
        debug!(seq, "loading keys");

        let result = self.inner.store.list_all().await;

        let mut control = self.inner.control();
        control.loads_in_flight -= 1;
        let outcome = match result {
            Ok(mut items) if seq == control.load_seq => {
                for mutation in control.journal.get(mark..).unwrap_or(&[]) {
                    mutation.apply_to(&mut items);
                }
                control.journal.clear();
                control.revision += 1;
                let count = items.len();
                self.inner.state.send_modify(|s| s.items = items);
                Ok(LoadOutcome::Applied(count))
            }
            Ok(_) => {
                warn!(seq, latest = control.load_seq, "discarding stale key load");
                Ok(LoadOutcome::Superseded)
            }
            Err(err) => Err(err),
        };
        if control.loads_in_flight == 0 {
            control.journal.clear();
        }
        outcome
    }

    /// Creates a key and puts it at the front of the collection.
    pub async fn create(&self, input: NewCredential) -> Result<IssuedCredential, KeyError> {
        let _loading = self.begin_loading();
        let issued = self.inner.store.create(input).await?;
        self.apply(Mutation::Prepend(issued.credential.clone()));
        Ok(issued)
    }

    pub async fn update(&self, id: &str, patch: CredentialPatch) -> Result<Option<Credential>, KeyError> {
        let _busy = self.claim(id)?;
        let _loading = self.begin_loading();
        let updated = self.inner.store.update(id, patch).await?;
        if let Some(record) = &updated {
            self.apply(Mutation::Replace(record.clone()));
        }
        Ok(updated)
    }

    pub async fn revoke(&self, id: &str) -> Result<Option<Credential>, KeyError> {
        let _busy = self.claim(id)?;
        let _loading = self.begin_loading();
        let revoked = self.inner.store.revoke(id).await?;
        if let Some(record) = &revoked {
            self.apply(Mutation::Replace(record.clone()));
        }
        Ok(revoked)
    }

    pub async fn regenerate(&self, id: &str) -> Result<Option<IssuedCredential>, KeyError> {
        let _busy = self.claim(id)?;
        let _loading = self.begin_loading();
        let issued = self.inner.store.regenerate(id).await?;
        if let Some(issued) = &issued {
            self.apply(Mutation::Replace(issued.credential.clone()));
        }
        Ok(issued)
    }

    pub async fn delete(&self, id: &str) -> Result<(), KeyError> {
        let _busy = self.claim(id)?;
        let _loading = self.begin_loading();
        self.inner.store.delete(id).await?;
        self.apply(Mutation::Remove(id.to_string()));
        Ok(())
    }

    /// Decrypt-for-copy. Does not touch the loading flag.
    pub async fn decrypt(&self, id: &str) -> Option<RevealedSecret> {
        self.inner.store.decrypt(id).await
    }

    /// Like [`decrypt`](Self::decrypt) but keeps the failure reason.
    pub async fn reveal(&self, id: &str) -> Result<RevealedSecret, RevealError> {
        self.inner.store.reveal(id).await
    }

    fn begin_loading(&self) -> LoadingGuard {
        let mut control = self.inner.control();
        control.pending += 1;
        if control.pending == 1 {
            self.inner.state.send_modify(|s| s.is_loading = true);
        }
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    fn claim(&self, id: &str) -> Result<BusyGuard, KeyError> {
        let mut control = self.inner.control();
        if !control.busy.insert(id.to_string()) {
            warn!(id, "rejecting overlapping mutation");
            return Err(KeyError::Busy(id.to_string()));
        }
        Ok(BusyGuard {
            inner: Arc::clone(&self.inner),
            id: id.to_string(),
        })
    }

    fn apply(&self, mutation: Mutation) {
        let mut control = self.inner.control();
        let mut changed = false;
        self.inner.state.send_if_modified(|s| {
            changed = mutation.apply_to(&mut s.items);
            changed
        });
        if changed {
            control.revision += 1;
        }
        if control.loads_in_flight > 0 {
            control.journal.push(mutation);
        }
    }
}
