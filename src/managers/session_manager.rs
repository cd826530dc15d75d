//! Session Manager for keydeck.
//!
//! Keeps the signed-in console user in the key-value area with a fixed
//! 24-hour lifetime. The key and stats surfaces use it as a gate: they only
//! answer while a user is present.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::{info, warn};

use crate::database::KeyValueStore;
use crate::types::errors::{SessionError, StorageError};
use crate::types::session::SessionUser;

pub const SESSION_ENTRY: &str = "auth-user";

/// Display name given to guest sessions.
pub const GUEST_NAME: &str = "Guest";

/// Lifetime of a session from sign-in.
pub fn session_ttl() -> Duration {
    Duration::hours(24)
}

/// Trait defining session management operations.
pub trait SessionManagerTrait {
    fn signin(&self, name: &str) -> Result<SessionUser, SessionError>;
    fn signin_guest(&self) -> Result<SessionUser, SessionError>;
    fn signout(&self) -> Result<(), SessionError>;
    fn current_user(&self) -> Result<Option<SessionUser>, SessionError>;
    fn current_user_at(&self, now: DateTime<Utc>) -> Result<Option<SessionUser>, SessionError>;
    fn is_authenticated(&self) -> Result<bool, SessionError>;
    fn purge_expired(&self) -> Result<bool, SessionError>;
}

/// Session manager backed by the key-value area.
pub struct SessionManager {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl SessionManager {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
        }
    }

    /// Stores a session for `name` starting at `now`.
    pub fn signin_at(&self, name: &str, is_guest: bool, now: DateTime<Utc>) -> Result<SessionUser, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidName(name.to_string()));
        }
        let user = SessionUser {
            name: name.to_string(),
            is_guest,
            // Stored with millisecond precision.
            expires_at: (now + session_ttl()).trunc_subsecs(3),
        };
        let raw = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.kv.set(&self.namespace, SESSION_ENTRY, &raw)?;
        info!(guest = is_guest, "signed in");
        Ok(user)
    }

    fn read(&self) -> Result<Option<SessionUser>, SessionError> {
        let Some(raw) = self.kv.get(&self.namespace, SESSION_ENTRY)? else {
            return Ok(None);
        };
        // `null` is what a signed-out console leaves behind.
        match serde_json::from_str::<Option<SessionUser>>(&raw) {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(error = %e, "stored session is unreadable, treating as signed out");
                Ok(None)
            }
        }
    }
}

impl SessionManagerTrait for SessionManager {
    fn signin(&self, name: &str) -> Result<SessionUser, SessionError> {
        self.signin_at(name, false, Utc::now())
    }

    fn signin_guest(&self) -> Result<SessionUser, SessionError> {
        self.signin_at(GUEST_NAME, true, Utc::now())
    }

    fn signout(&self) -> Result<(), SessionError> {
        self.kv.remove(&self.namespace, SESSION_ENTRY)?;
        info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> Result<Option<SessionUser>, SessionError> {
        self.current_user_at(Utc::now())
    }

    /// Returns the user unless the session expired, in which case the stored
    /// session is cleared.
    fn current_user_at(&self, now: DateTime<Utc>) -> Result<Option<SessionUser>, SessionError> {
        match self.read()? {
            Some(user) if user.is_expired_at(now) => {
                self.kv.remove(&self.namespace, SESSION_ENTRY)?;
                info!("session expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn is_authenticated(&self) -> Result<bool, SessionError> {
        Ok(self.current_user()?.is_some())
    }

    /// Clears an expired session. Returns true when one was removed.
    fn purge_expired(&self) -> Result<bool, SessionError> {
        let had_session = self.read()?.is_some();
        Ok(had_session && self.current_user()?.is_none())
    }
}
