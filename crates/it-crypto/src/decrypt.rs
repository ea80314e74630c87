//! Opening and verifying a shared log.
//!
//! Decryption is a fixed sequence of stages, each of which either advances
//! or fails the whole call:
//!
//! 1. open the envelope with the receiver's key
//! 2. parse the plaintext as a signed SharedLog
//! 3. read the claimed creator (unverified)
//! 4. resolve the creator and verify the SharedLog signature
//! 5. read the claimed monitor from the inner log (unverified)
//! 6. resolve the monitor, require the monitor privilege and verify the
//!    AccessLog signature
//! 7. check the sharing rules across header, SharedLog and AccessLog
//!
//! Unverified reads only ever pick the key to verify with. Nothing read
//! before its signature was checked is used for a decision.

use it_crypto_core::{CoreError, SignedLog, SignedSharedLog};
use it_crypto_perms::{check_sharing, Envelope};

use crate::error::{ItCryptoError, Result};
use crate::identity::AuthenticatedUser;
use crate::resolver::UserResolver;

/// Decrypt `jwe` as `receiver` and return the verified, monitor-signed log.
///
/// `resolver` supplies the public identities of the creator and the monitor.
pub fn decrypt<R>(jwe: &str, receiver: &AuthenticatedUser, resolver: &R) -> Result<SignedLog>
where
    R: UserResolver + ?Sized,
{
    let envelope = Envelope::parse(jwe)
        .map_err(|e| ItCryptoError::parse("Failed to parse JWE").with_source(e))?;
    let plaintext = envelope
        .decrypt(receiver.decryption_key())
        .map_err(|e| ItCryptoError::decryption("Could not decrypt JWE").with_source(e))?;
    tracing::debug!(receiver = receiver.id(), "opened envelope");

    let plaintext = String::from_utf8(plaintext)
        .map_err(|e| ItCryptoError::parse("Could not parse jwsSharedLog").with_source(e))?;
    let signed_shared = SignedSharedLog::parse(&plaintext)
        .map_err(|e| ItCryptoError::parse("Could not parse jwsSharedLog").with_source(e))?;

    let claimed_creator = signed_shared
        .peek()
        .map_err(|e| ItCryptoError::parse("Failed to extract creator").with_source(e))?
        .creator;
    let creator = resolver.fetch_user(&claimed_creator)?;
    let shared = signed_shared
        .verify(creator.verification_certificate())
        .map_err(|e| verification_error("jwsSharedLog", e))?;
    tracing::debug!(creator = creator.id(), "verified shared log");

    let claimed_monitor = shared
        .log
        .peek()
        .map_err(|e| ItCryptoError::parse("Failed to extract monitor").with_source(e))?
        .monitor;
    let monitor = resolver.fetch_user(&claimed_monitor)?;
    if !monitor.is_monitor() {
        tracing::warn!(monitor = monitor.id(), "access log signed by a non-monitor");
        return Err(ItCryptoError::authorization(format!(
            "The claimed monitor {} is not authorized to sign logs",
            monitor.id()
        )));
    }
    let access_log = shared
        .log
        .verify(monitor.verification_certificate())
        .map_err(|e| verification_error("jwsAccessLog", e))?;
    tracing::debug!(monitor = monitor.id(), owner = %access_log.owner, "verified access log");

    if let Err(violation) = check_sharing(&envelope.claims(), &shared, &access_log, receiver.id())
    {
        tracing::warn!(
            receiver = receiver.id(),
            creator = %shared.creator,
            %violation,
            "rejected shared log"
        );
        return Err(violation.into());
    }

    Ok(shared.log)
}

/// Signature failures and unusable payloads are told apart.
fn verification_error(what: &str, err: CoreError) -> ItCryptoError {
    match err {
        CoreError::DecodingError(_) => {
            ItCryptoError::parse(format!("Could not deserialize payload in {what}"))
                .with_source(err)
        }
        other => ItCryptoError::signature(format!("Could not verify signature of {what}"))
            .with_source(other),
    }
}

impl AuthenticatedUser {
    /// Decrypt a shared log addressed to this user. See [`decrypt`].
    pub fn decrypt_log<R>(&self, jwe: &str, resolver: &R) -> Result<SignedLog>
    where
        R: UserResolver + ?Sized,
    {
        decrypt(jwe, self, resolver)
    }
}
