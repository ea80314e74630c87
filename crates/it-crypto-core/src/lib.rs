//! # it-crypto core
//!
//! Pure primitives for it-crypto: P-256 keys, ES256 signatures and the
//! access log data model.
//!
//! This crate contains no I/O and no encryption. It is pure computation over
//! signed JSON records.
//!
//! ## Key Types
//!
//! - [`AccessLog`] - A monitor's record of accessing an owner's data
//! - [`SharedLog`] - Who forwards a signed log, and to whom
//! - [`Signed`] - A JWS typed by its payload ([`SignedLog`], [`SignedSharedLog`])
//! - [`SigningKey`] / [`VerifyingKey`] - ES256 key pair
//! - [`DecryptionKey`] / [`EncryptionKey`] - ECDH key pair
//!
//! ## Encoding
//!
//! Records are signed over their serde JSON in field order; every binary value
//! on the wire is unpadded base64url. See [`canonical`].

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod jws;
pub mod logs;

pub use canonical::{b64_decode, b64_encode, canonical_json};
pub use crypto::{DecryptionKey, EncryptionKey, SigningKey, VerifyingKey};
pub use error::{CoreError, Result};
pub use jws::{Jws, ES256};
pub use logs::{AccessLog, SharedLog, Signed, SignedLog, SignedSharedLog};
