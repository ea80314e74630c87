//! Sharing policy.
//!
//! Once both signature layers of a shared log have been verified, the
//! decrypting party checks that the envelope, the signed sharing act and the
//! signed access log agree with each other, and that the sharer was allowed to
//! share with whom it did. Rules are checked in a fixed order and the first
//! broken rule is reported.

use thiserror::Error;

use it_crypto_core::{AccessLog, SharedLog};

/// A broken sharing rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    /// The protected header lists different recipients than the signed
    /// SharedLog, element by element.
    #[error("The recipients in the protected header do not match the recipients of the SharedLog.")]
    RecipientsMismatch,

    /// The decrypting party is not one of the signed recipients.
    #[error("The receiver {0} is not among the recipients of the SharedLog.")]
    NotARecipient(String),

    /// The protected header names a different owner than the AccessLog.
    #[error("The owner of the AccessLog is not specified as owner in the protected header!")]
    OwnerMismatch,

    /// Someone other than the monitor or the owner shared the log.
    #[error("Only the owner or the monitor of the AccessLog are allowed to share.")]
    UnauthorizedCreator,

    /// The monitor shared with someone other than exactly the owner.
    #[error("Monitors can only share the data with the owner of the log.")]
    MonitorFanOut,
}

/// What the integrity-protected envelope header claims about its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderClaims<'a> {
    pub recipients: Option<&'a [String]>,
    pub owner: Option<&'a str>,
}

/// Check the sharing rules for `receiver`, in order:
///
/// 1. header recipients equal the signed recipients, as a sequence
/// 2. `receiver` is a signed recipient
/// 3. header owner equals the access log's owner
/// 4. the creator is the log's monitor or owner
/// 5. a monitor shares with exactly `[owner]`
pub fn check_sharing(
    claims: &HeaderClaims<'_>,
    shared: &SharedLog,
    log: &AccessLog,
    receiver: &str,
) -> Result<(), PolicyViolation> {
    if claims.recipients != Some(shared.recipients.as_slice()) {
        return Err(PolicyViolation::RecipientsMismatch);
    }

    if !shared.is_recipient(receiver) {
        return Err(PolicyViolation::NotARecipient(receiver.to_string()));
    }

    if claims.owner != Some(log.owner.as_str()) {
        return Err(PolicyViolation::OwnerMismatch);
    }

    if shared.creator != log.monitor && shared.creator != log.owner {
        return Err(PolicyViolation::UnauthorizedCreator);
    }

    if shared.creator == log.monitor && shared.recipients != [log.owner.as_str()] {
        return Err(PolicyViolation::MonitorFanOut);
    }

    Ok(())
}
