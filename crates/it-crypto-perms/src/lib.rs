//! # it-crypto perms
//!
//! Sharing of signed logs: multi-recipient encryption and the rules that
//! decide whether a shared log may be accepted.
//!
//! ## Encryption Model
//!
//! A shared log is encrypted once and opened by many:
//!
//! 1. **Content Key**: a random A256GCM key encrypts the payload
//! 2. **Key Shares**: the content key is wrapped per recipient with
//!    ECDH-ES+A256KW against the recipient's P-256 encryption key
//!
//! The envelope is a JWE in JSON serialization. Its protected header carries
//! the `recipients` and `owner` claims, which the [`policy`] cross-checks
//! against the signed content after decryption.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use it_crypto_core::DecryptionKey;
//! use it_crypto_perms::{Envelope, EnvelopeBuilder};
//!
//! let owner = DecryptionKey::generate();
//! let envelope = EnvelopeBuilder::new(b"signed shared log".to_vec())
//!     .recipients_claim(vec!["owner".into()])
//!     .owner_claim("owner")
//!     .add_recipient(owner.encryption_key())
//!     .build()
//!     .unwrap();
//!
//! let wire = envelope.to_json().unwrap();
//! let plaintext = Envelope::parse(&wire).unwrap().decrypt(&owner).unwrap();
//! ```

pub mod crypto;
pub mod envelope;
pub mod error;
pub mod keyshare;
pub mod policy;

pub use crypto::{ContentIv, ContentKey, KeyEncryptionKey};
pub use envelope::{Envelope, EnvelopeBuilder, JoseHeader, RecipientEntry, A256GCM};
pub use error::{PermsError, Result};
pub use keyshare::{EcJwk, KeyShare, ECDH_ES_A256KW};
pub use policy::{check_sharing, HeaderClaims, PolicyViolation};
