//! Integrity checksums and the key format.
//!
//! Generated secrets look like `zmk_v1_<body>` where the body is drawn from a
//! URL-safe 64-symbol alphabet. The checksum is a classic 32-bit rolling
//! hash: it detects accidental damage, it is not a cryptographic digest.

use ring::rand::{SecureRandom, SystemRandom};

use crate::types::credential::{MASK_GLYPH, VISIBLE_PREFIX_LEN};
use crate::types::errors::CryptoError;

/// Scheme tag shared by secrets and encrypted payloads.
pub const SCHEME_TAG: &str = "zmk";

/// Format version embedded in every generated secret.
pub const FORMAT_VERSION: &str = "v1";

/// Default length of the random body of a generated secret.
pub const DEFAULT_SECRET_LENGTH: usize = 32;

/// URL-safe alphabet the secret body is drawn from.
pub const SECRET_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// `zmk_v1_`
pub fn secret_prefix() -> String {
    format!("{SCHEME_TAG}_{FORMAT_VERSION}_")
}

/// Deterministic 8-hex-digit fingerprint of `text`.
///
/// Folds UTF-16 code units as `hash * 31 + unit` in wrapping 32-bit signed
/// arithmetic, then prints the magnitude zero-padded.
pub fn checksum(text: &str) -> String {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    format!("{:08x}", hash.unsigned_abs())
}

/// Produces a fresh secret with a `length`-character random body.
pub fn generate_secret(length: usize) -> Result<String, CryptoError> {
    let mut bytes = vec![0u8; length];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| CryptoError::RandomGeneration("system random source unavailable".to_string()))?;

    let mut secret = secret_prefix();
    secret.extend(
        bytes
            .iter()
            .map(|b| SECRET_ALPHABET[usize::from(*b % 64)] as char),
    );
    Ok(secret)
}

/// Structural check: prefix, version, then a non-empty alphabet-only body.
pub fn validate_format(candidate: &str) -> bool {
    match candidate.strip_prefix(&secret_prefix()) {
        Some(body) => !body.is_empty() && body.bytes().all(|b| SECRET_ALPHABET.contains(&b)),
        None => false,
    }
}

/// Masked display form: the first eight characters, then one glyph per
/// remaining character. Secrets no longer than the visible prefix are fully
/// masked so the display value never equals the secret.
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= VISIBLE_PREFIX_LEN {
        return MASK_GLYPH.to_string().repeat(len.max(1));
    }
    let visible: String = secret.chars().take(VISIBLE_PREFIX_LEN).collect();
    let hidden = MASK_GLYPH.to_string().repeat(len - VISIBLE_PREFIX_LEN);
    visible + &hidden
}

/// True for display values that look like a raw secret written by an older
/// build: no mask glyph and longer than the visible prefix.
pub fn looks_unmasked(display_value: &str) -> bool {
    !display_value.contains(MASK_GLYPH) && display_value.chars().count() > VISIBLE_PREFIX_LEN
}
