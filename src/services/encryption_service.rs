//! Simulated at-rest encryption for stored secrets.
//!
//! The payload is `zmk_enc:<base64 of the UTF-8 plaintext>:<checksum>`. It is
//! reversible by anyone and exists so the rest of the console can treat
//! "encrypted payload" and "decrypt failed" as real concepts. It provides no
//! confidentiality.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;

use crate::services::checksum::{checksum, SCHEME_TAG};
use crate::services::latency::Latency;
use crate::types::credential::{EncryptionMetadata, RevealedSecret};
use crate::types::errors::DecryptError;
use crate::types::settings::LatencySettings;

pub const ALGORITHM: &str = "TFHE";
pub const PROVIDER: &str = "keydeck simulated TFHE";
pub const SCHEME_VERSION: &str = "1.0.0";
pub const SECURITY_LEVEL: &str = "Simulated (not secure)";

/// `zmk_enc:`
pub fn payload_prefix() -> String {
    format!("{SCHEME_TAG}_enc:")
}

/// Static description of the scheme, for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeInfo {
    pub algorithm: &'static str,
    pub provider: &'static str,
    pub version: &'static str,
    pub security_level: &'static str,
    pub encrypted: bool,
}

/// Encodes `plaintext` into the three-part payload. Accepts any string.
pub fn encode_payload(plaintext: &str) -> String {
    format!(
        "{}{}:{}",
        payload_prefix(),
        BASE64.encode(plaintext.as_bytes()),
        checksum(plaintext)
    )
}

/// Parses and verifies a payload produced by [`encode_payload`].
pub fn decode_payload(encoded: &str) -> Result<String, DecryptError> {
    if !encoded.starts_with(&payload_prefix()) {
        return Err(DecryptError::InvalidFormat);
    }

    let parts: Vec<&str> = encoded.split(':').collect();
    let [_, body, expected] = parts.as_slice() else {
        return Err(DecryptError::Corrupted);
    };

    let bytes = BASE64.decode(body).map_err(|_| DecryptError::Corrupted)?;
    let plaintext = String::from_utf8(bytes).map_err(|_| DecryptError::Corrupted)?;

    if checksum(&plaintext) != *expected {
        return Err(DecryptError::ChecksumMismatch);
    }
    Ok(plaintext)
}

/// Asynchronous facade over the payload codec with simulated latency.
#[derive(Debug, Clone)]
pub struct EncryptionService {
    encrypt_latency: Latency,
    decrypt_latency: Latency,
}

impl EncryptionService {
    pub fn new(encrypt_latency: Latency, decrypt_latency: Latency) -> Self {
        Self {
            encrypt_latency,
            decrypt_latency,
        }
    }

    pub fn from_settings(latency: &LatencySettings) -> Self {
        Self::new(
            Latency::from_millis(latency.encrypt_payload_ms, latency.jitter_ms),
            Latency::from_millis(latency.decrypt_payload_ms, latency.jitter_ms),
        )
    }

    pub fn instant() -> Self {
        Self::new(Latency::NONE, Latency::NONE)
    }

    pub async fn encrypt(&self, plaintext: &str) -> String {
        self.encrypt_latency.wait().await;
        encode_payload(plaintext)
    }

    /// Never panics on malformed input; every failure is a [`DecryptError`].
    pub async fn decrypt(&self, encoded: &str) -> Result<RevealedSecret, DecryptError> {
        self.decrypt_latency.wait().await;
        decode_payload(encoded).map(RevealedSecret::new)
    }

    pub fn describe_scheme(&self) -> SchemeInfo {
        SchemeInfo {
            algorithm: ALGORITHM,
            provider: PROVIDER,
            version: SCHEME_VERSION,
            security_level: SECURITY_LEVEL,
            encrypted: true,
        }
    }

    /// Metadata recorded next to a payload freshly produced from `plaintext`.
    pub fn metadata_for(&self, plaintext: &str) -> EncryptionMetadata {
        EncryptionMetadata {
            algorithm: ALGORITHM.to_string(),
            provider: PROVIDER.to_string(),
            version: SCHEME_VERSION.to_string(),
            checksum: checksum(plaintext),
        }
    }
}

impl Default for EncryptionService {
    fn default() -> Self {
        Self::from_settings(&LatencySettings::default())
    }
}
