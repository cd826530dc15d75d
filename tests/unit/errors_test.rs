//! Unit tests for the keydeck error types: display text and conversions.

use keydeck::types::errors::{
    AppError, CryptoError, DecryptError, KeyError, RevealError, SessionError, StorageError,
};

#[test]
fn test_decrypt_error_messages() {
    assert_eq!(DecryptError::InvalidFormat.to_string(), "Invalid encrypted data format");
    assert_eq!(DecryptError::Corrupted.to_string(), "Corrupted encrypted data");
    assert_eq!(DecryptError::ChecksumMismatch.to_string(), "Checksum verification failed");
}

#[test]
fn test_key_error_wraps_storage_transparently() {
    let inner = StorageError::Unavailable("lock poisoned".to_string());
    let expected = inner.to_string();
    let err: KeyError = inner.into();
    assert!(matches!(err, KeyError::Storage(_)));
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_key_error_wraps_crypto() {
    let err: KeyError = CryptoError::RandomGeneration("no entropy".to_string()).into();
    assert!(err.to_string().contains("no entropy"));
}

#[test]
fn test_reveal_error_from_decrypt() {
    let err: RevealError = DecryptError::ChecksumMismatch.into();
    assert!(matches!(err, RevealError::Decrypt(DecryptError::ChecksumMismatch)));
    assert_eq!(err.to_string(), "Decryption failed: Checksum verification failed");
}

#[test]
fn test_storage_error_from_serde() {
    let bad = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
    let err: StorageError = bad.into();
    assert!(err.to_string().starts_with("Storage serialization error"));
}

#[test]
fn test_app_error_conversions() {
    let err: AppError = SessionError::InvalidName(" ".to_string()).into();
    assert!(matches!(err, AppError::Session(_)));

    let err: AppError = KeyError::Busy("k1".to_string()).into();
    assert_eq!(err.to_string(), "Key is busy: k1");
}
