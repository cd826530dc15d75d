use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in console user. Stored so a reload keeps the session alive
/// until `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub name: String,
    #[serde(default)]
    pub is_guest: bool,
    /// Persisted as epoch milliseconds under `exp`.
    #[serde(rename = "exp", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
