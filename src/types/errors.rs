use thiserror::Error;

// === DecryptError ===

/// Reasons a simulated-encryption payload could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecryptError {
    /// The payload does not start with the scheme tag.
    #[error("Invalid encrypted data format")]
    InvalidFormat,
    /// The payload does not split into exactly three segments, or the body
    /// is not decodable.
    #[error("Corrupted encrypted data")]
    Corrupted,
    /// The decoded body does not match the stored checksum.
    #[error("Checksum verification failed")]
    ChecksumMismatch,
}

// === CryptoError ===

/// Errors raised while producing secrets.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The system random source refused to produce bytes.
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),
}

// === StorageError ===

/// Errors from the local key-value area.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The backing store cannot be reached (e.g. a poisoned lock).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// === KeyError ===

/// Errors surfaced by the credential store and the key lifecycle manager.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A mutating operation for this key id is already outstanding.
    #[error("Key is busy: {0}")]
    Busy(String),
    #[error("Invalid key input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// === RevealError ===

/// Detailed outcome of a failed decrypt-for-display.
#[derive(Debug, Error)]
pub enum RevealError {
    #[error("Key not found: {0}")]
    NotFound(String),
    /// The record carries no encrypted payload (legacy or damaged record).
    #[error("Key has no encrypted payload: {0}")]
    DecryptionUnavailable(String),
    #[error("Decryption failed: {0}")]
    Decrypt(#[from] DecryptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// === SettingsError ===

/// Errors related to console settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    IoError(String),
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === FlagError ===

/// Errors related to feature flag handling.
#[derive(Debug, Error)]
pub enum FlagError {
    #[error("Invalid feature flag value: {0}")]
    InvalidValue(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// === PreferenceError ===

/// Errors related to theme and locale preferences.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// === SessionError ===

/// Errors related to the signed-in session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid user name: {0:?}")]
    InvalidName(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// === StatsError ===

/// Errors related to mock usage statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// === AppError ===

/// Errors raised while assembling or starting the console.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Flag(#[from] FlagError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Key(#[from] KeyError),
}
