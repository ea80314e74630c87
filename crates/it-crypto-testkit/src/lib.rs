//! # it-crypto testkit
//!
//! Testing utilities for it-crypto.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a development CA, two identities it signed, and a
//!   ready-made cast for sharing scenarios
//! - **Vectors**: envelopes recorded from other implementations of the
//!   protocol, for interoperability checks
//! - **Generators**: proptest strategies for access logs and recipient sets
//!
//! ## Compatibility Vectors
//!
//! ```rust
//! use it_crypto_testkit::vectors::verify_all_vectors;
//!
//! assert_eq!(verify_all_vectors().unwrap(), 9);
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use it_crypto_testkit::generators::SharingParams;
//!
//! proptest! {
//!     #[test]
//!     fn owner_can_always_reshare(params: SharingParams) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use it_crypto_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let jwe = fixture
//!     .monitor
//!     .encrypt_log(&fixture.signed_log(), &[fixture.owner.remote()])
//!     .unwrap();
//! assert!(fixture.owner.decrypt_log(&jwe, &fixture.directory()).is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_access_log, TestFixture};
pub use generators::SharingParams;
pub use vectors::{multi_receiver_vectors, single_receiver_vectors, verify_all_vectors, CompatVector};
