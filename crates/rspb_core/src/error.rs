//! Application error types for history storage and form validation.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Local form validation failures, raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Cannot create empty paste.")]
    EmptyPaste,

    #[error("Please provide a paste ID.")]
    MissingId,

    #[error("Please provide key.")]
    MissingKey,

    #[error("Expire time must be a whole number, got '{0}'.")]
    InvalidExpireAmount(String),

    #[error("Expire time is too large.")]
    ExpireAmountTooLarge,
}
