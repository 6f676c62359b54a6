use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Password Hero.
#[derive(Debug, Error)]
pub enum PassHeroError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong passphrase or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Invalid master passphrase")]
    InvalidMasterPassphrase,

    #[error("No such application: '{0}'")]
    NoSuchApplication(String),

    #[error("Application '{0}' already has a password (use `change` to replace it)")]
    ApplicationExists(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    // --- Datastore errors ---
    #[error("Datastore unavailable at {path}: {reason}")]
    DatastoreUnavailable { path: PathBuf, reason: String },

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Failed to persist vault: {0}")]
    PersistenceFailed(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),
}

impl PassHeroError {
    /// Build a `DatastoreUnavailable` error for `path`.
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DatastoreUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for Password Hero results.
pub type Result<T> = std::result::Result<T, PassHeroError>;
