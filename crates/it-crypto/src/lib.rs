//! # it-crypto
//!
//! Inverse transparency: data owners learn who accessed their data and why.
//!
//! ## Overview
//!
//! - **AccessLog**: a record of a monitor accessing an owner's data
//! - **SignedLog**: an AccessLog attested (ES256-signed) by its monitor
//! - **SharedLog**: one act of forwarding a SignedLog, naming the creator and
//!   the recipients, itself signed by the creator
//! - **Envelope**: the signed SharedLog encrypted for every recipient (JWE)
//!
//! A monitor may only share a log with its owner. The owner may re-share it
//! with anyone. On decryption every signature is checked against identities
//! obtained from a [`UserResolver`], and the layers are checked to agree.
//!
//! ## Usage
//!
//! ```rust
//! use it_crypto::{AccessLog, AuthenticatedUser, UserDirectory};
//!
//! # fn main() -> it_crypto::Result<()> {
//! let monitor = AuthenticatedUser::generate(Some("monitor")).with_monitor(true);
//! let owner = AuthenticatedUser::generate(Some("owner"));
//! let directory = UserDirectory::new()
//!     .with_user(monitor.remote())
//!     .with_user(owner.remote());
//!
//! let log = AccessLog {
//!     monitor: "monitor".into(),
//!     owner: "owner".into(),
//!     tool: "crm".into(),
//!     justification: "support ticket".into(),
//!     timestamp: 1_700_000_000,
//!     access_kind: "direct".into(),
//!     data_type: vec!["Email".into()],
//! };
//!
//! let signed = monitor.sign_log(&log)?;
//! let jwe = monitor.encrypt_log(&signed, &[owner.remote()])?;
//!
//! let received = owner.decrypt_log(&jwe, &directory)?;
//! assert_eq!(received.peek().unwrap(), log);
//! # Ok(())
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `it_crypto::core` - keys, JWS and the log data model
//! - `it_crypto::perms` - the JWE envelope and the sharing rules

pub mod client;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod identity;
pub mod pki;
pub mod resolver;
pub mod signing;

// Re-export component crates
pub use it_crypto_core as core;
pub use it_crypto_perms as perms;

pub use client::{ItCrypto, ItCryptoConfig};
pub use decrypt::decrypt;
pub use encrypt::encrypt;
pub use error::{BoxError, ItCryptoError, Result};
pub use identity::{AuthenticatedUser, RemoteUser};
pub use resolver::{LookupError, UserDirectory, UserResolver};

// Re-export commonly used types
pub use it_crypto_core::{AccessLog, Jws, SharedLog, SignedLog, SignedSharedLog};
pub use it_crypto_perms::PolicyViolation;
