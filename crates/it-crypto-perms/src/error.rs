//! Error types for the sharing layer.

use thiserror::Error;

use crate::policy::PolicyViolation;

/// Errors that can occur while building, opening or checking an envelope.
#[derive(Debug, Error)]
pub enum PermsError {
    /// Content encryption failed.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// No recipient entry could be opened, or the content failed authentication.
    #[error("decryption error: {0}")]
    DecryptionError(String),

    /// Wrapping or unwrapping a content key failed.
    #[error("key wrap error: {0}")]
    KeyWrapError(String),

    /// The envelope is not a well-formed JWE.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope uses an algorithm this implementation does not speak.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// A cross-layer sharing rule was broken.
    #[error("policy violation: {0}")]
    PolicyViolation(#[from] PolicyViolation),

    /// Core error.
    #[error("core error: {0}")]
    CoreError(#[from] it_crypto_core::CoreError),
}

/// Result type for sharing operations.
pub type Result<T> = std::result::Result<T, PermsError>;
