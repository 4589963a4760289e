// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Stored data under '{key}' is corrupt: {reason}")]
    CorruptData { key: String, reason: String },
    #[error("Stored collection under '{key}' has an unreadable record: {reason}")]
    InvalidRecord { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Argon2 hashing failed: {0}")]
    Argon2(String),
}

/// User-facing validation failures. The messages are shown as-is.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ValidationError {
    #[error("Please enter a title")]
    EmptyTitle,
    #[error("Please enter some content")]
    EmptyContent,
    #[error("Please enter a password")]
    MissingNotePassword,
    #[error("Please enter the password")]
    EmptyCandidate,
    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Please enter both Username/Email and password")]
    EmptyCredential,
    #[error("Please enter your name")]
    EmptyUsername,
    #[error("Unknown note color '{0}'")]
    UnknownColor(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BiometricError {
    #[error("Biometric authentication not available on this device")]
    NotSupported,
    #[error("Authentication failed, please try again")]
    AuthenticationFailed,
    #[error("Failed to update biometric settings")]
    Persist,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Biometric(#[from] BiometricError),
    #[error("{0}")]
    Cli(String),
}

pub type AppResult<T> = Result<T, AppError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type CryptoResult<T> = Result<T, CryptoError>;
