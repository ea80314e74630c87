//! Error types for the public API.
//!
//! Every failure names the stage that produced it. The description is meant
//! for humans; match on the variant to react programmatically.

use std::error::Error as StdError;

use thiserror::Error;

use it_crypto_perms::PolicyViolation;

use crate::resolver::LookupError;

/// Boxed underlying cause of an [`ItCryptoError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors that can occur while importing identities, signing, sharing or
/// verifying access logs.
#[derive(Debug, Error)]
pub enum ItCryptoError {
    /// PEM, X.509, key or JOSE input could not be decoded.
    #[error("parse error: {description}")]
    Parse {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A signature did not verify.
    #[error("signature error: {description}")]
    Signature {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A certificate is not signed by the trust anchor.
    #[error("trust error: {description}")]
    Trust {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The acting party lacks the privilege, or a precondition is unmet.
    #[error("authorization error: {description}")]
    Authorization {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The layers of a shared log disagree with each other.
    #[error("malformed data: {0}")]
    MalformedData(#[from] PolicyViolation),

    /// The envelope could not be opened with the receiver's key.
    #[error("decryption error: {description}")]
    Decryption {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A record could not be serialized.
    #[error("serialization error: {description}")]
    Serialization {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Key material could not be generated, loaded or used.
    #[error("key material error: {description}")]
    KeyMaterial {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The envelope could not be built.
    #[error("encryption error: {description}")]
    Encryption {
        description: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The identity resolver failed.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),
}

impl ItCryptoError {
    pub fn parse(description: impl Into<String>) -> Self {
        Self::Parse {
            description: description.into(),
            source: None,
        }
    }

    pub fn signature(description: impl Into<String>) -> Self {
        Self::Signature {
            description: description.into(),
            source: None,
        }
    }

    pub fn trust(description: impl Into<String>) -> Self {
        Self::Trust {
            description: description.into(),
            source: None,
        }
    }

    pub fn authorization(description: impl Into<String>) -> Self {
        Self::Authorization {
            description: description.into(),
            source: None,
        }
    }

    pub fn decryption(description: impl Into<String>) -> Self {
        Self::Decryption {
            description: description.into(),
            source: None,
        }
    }

    pub fn serialization(description: impl Into<String>) -> Self {
        Self::Serialization {
            description: description.into(),
            source: None,
        }
    }

    pub fn key_material(description: impl Into<String>) -> Self {
        Self::KeyMaterial {
            description: description.into(),
            source: None,
        }
    }

    pub fn encryption(description: impl Into<String>) -> Self {
        Self::Encryption {
            description: description.into(),
            source: None,
        }
    }

    /// Attach the underlying cause. No-op for variants that wrap a typed
    /// cause already.
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            Self::Parse { source, .. }
            | Self::Signature { source, .. }
            | Self::Trust { source, .. }
            | Self::Authorization { source, .. }
            | Self::Decryption { source, .. }
            | Self::Serialization { source, .. }
            | Self::KeyMaterial { source, .. }
            | Self::Encryption { source, .. } => *source = Some(cause.into()),
            Self::MalformedData(_) | Self::Lookup(_) => {}
        }
        self
    }

    /// The human-readable description, without the category prefix.
    pub fn description(&self) -> String {
        match self {
            Self::Parse { description, .. }
            | Self::Signature { description, .. }
            | Self::Trust { description, .. }
            | Self::Authorization { description, .. }
            | Self::Decryption { description, .. }
            | Self::Serialization { description, .. }
            | Self::KeyMaterial { description, .. }
            | Self::Encryption { description, .. } => description.clone(),
            Self::MalformedData(violation) => violation.to_string(),
            Self::Lookup(err) => err.to_string(),
        }
    }
}

/// Result type for it-crypto operations.
pub type Result<T> = std::result::Result<T, ItCryptoError>;
