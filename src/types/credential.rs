use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Glyph used to hide the secret portion of a display value.
pub const MASK_GLYPH: char = '•';

/// Number of leading secret characters left visible in a display value.
pub const VISIBLE_PREFIX_LEN: usize = 8;

/// Describes how the stored payload of a credential was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionMetadata {
    pub algorithm: String,
    pub provider: String,
    pub version: String,
    /// Checksum of the plaintext secret at the time of the last encryption.
    pub checksum: String,
}

/// A managed API key record, exactly as it is persisted.
///
/// `display_value` is always the masked form; the real secret only exists in
/// `encrypted_payload`. Field aliases accept records written by older builds
/// of the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "key")]
    pub display_value: String,
    #[serde(default, alias = "encryptedKey")]
    pub encrypted_payload: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "readRules")]
    pub read_scopes: BTreeSet<String>,
    #[serde(default, alias = "writeRules")]
    pub write_scopes: BTreeSet<String>,
    #[serde(default)]
    pub last_regenerated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "encryptionInfo")]
    pub encryption_metadata: Option<EncryptionMetadata>,
}

/// A plaintext secret held in memory for a one-time reveal or a copy.
///
/// The buffer is wiped on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct RevealedSecret(String);

impl RevealedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrows the plaintext. Callers must not persist it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RevealedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RevealedSecret([REDACTED])")
    }
}

/// Result of `create`/`regenerate`: the masked record plus its one-time secret.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub credential: Credential,
    pub secret: RevealedSecret,
}

/// Input for creating a credential.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Caller-supplied secret; generated when absent.
    #[serde(default)]
    pub secret: Option<RevealedSecret>,
    #[serde(default)]
    pub read_scopes: Option<BTreeSet<String>>,
    #[serde(default)]
    pub write_scopes: Option<BTreeSet<String>>,
}

impl NewCredential {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_scopes<R, W>(mut self, read: R, write: W) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        W: IntoIterator,
        W::Item: Into<String>,
    {
        self.read_scopes = Some(read.into_iter().map(Into::into).collect());
        self.write_scopes = Some(write.into_iter().map(Into::into).collect());
        self
    }
}

/// Editable fields of a credential. `None` leaves a field untouched;
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub read_scopes: Option<BTreeSet<String>>,
    #[serde(default)]
    pub write_scopes: Option<BTreeSet<String>>,
}

impl CredentialPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.read_scopes.is_none()
            && self.write_scopes.is_none()
    }
}

/// A field that is present, even as `null`, becomes `Some(..)`; an absent
/// field is left to `#[serde(default)]`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
