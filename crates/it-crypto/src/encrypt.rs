//! Sharing a signed access log.
//!
//! The sender wraps the monitor-signed log in a [`SharedLog`] naming itself
//! and the receivers, signs that, and encrypts the result for every
//! receiver in one envelope. The envelope's protected header repeats the
//! receivers and the log's owner so they are bound to the ciphertext.

use it_crypto_core::{SharedLog, SignedLog, SignedSharedLog};
use it_crypto_perms::{EnvelopeBuilder, PermsError};

use crate::error::{ItCryptoError, Result};
use crate::identity::{AuthenticatedUser, RemoteUser};
use crate::signing::signing_error;

/// Encrypt `log` from `sender` for `receivers`, returning the envelope in
/// JWE JSON serialization.
///
/// Receivers are listed in the order given; duplicates are kept.
pub fn encrypt(
    log: &SignedLog,
    sender: &AuthenticatedUser,
    receivers: &[RemoteUser],
) -> Result<String> {
    if receivers.is_empty() {
        return Err(ItCryptoError::encryption(
            "at least one receiver is required to share a log",
        ));
    }

    let recipients: Vec<String> = receivers.iter().map(|r| r.id().to_string()).collect();
    let shared = SharedLog {
        log: log.clone(),
        recipients: recipients.clone(),
        creator: sender.id().to_string(),
    };

    let signed = SignedSharedLog::sign(&shared, sender.signing_key()).map_err(signing_error)?;
    let plaintext = signed.to_json().map_err(|e| {
        ItCryptoError::serialization("Could not serialize sharedLog").with_source(e)
    })?;

    let owner = log
        .peek()
        .map_err(|e| ItCryptoError::parse("Could not read provided accessLog").with_source(e))?
        .owner;

    let envelope = receivers
        .iter()
        .fold(
            EnvelopeBuilder::new(plaintext)
                .recipients_claim(recipients)
                .owner_claim(owner),
            |builder, receiver| builder.add_recipient(receiver.encryption_certificate().clone()),
        )
        .build()
        .map_err(envelope_error)?;

    tracing::debug!(
        creator = sender.id(),
        recipients = receivers.len(),
        "encrypted shared log"
    );

    envelope
        .to_json()
        .map_err(|e| ItCryptoError::serialization("Could not serialize envelope").with_source(e))
}

fn envelope_error(err: PermsError) -> ItCryptoError {
    match err {
        PermsError::KeyWrapError(_) | PermsError::CoreError(_) => {
            ItCryptoError::key_material("Could not wrap content key").with_source(err)
        }
        other => ItCryptoError::encryption("Could not encrypt").with_source(other),
    }
}

impl AuthenticatedUser {
    /// Share `log` with `receivers`. See [`encrypt`].
    pub fn encrypt_log(&self, log: &SignedLog, receivers: &[RemoteUser]) -> Result<String> {
        encrypt(log, self, receivers)
    }
}
