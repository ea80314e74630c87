//! Signing access logs.

use it_crypto_core::{AccessLog, CoreError, Jws, SignedLog};

use crate::error::{ItCryptoError, Result};
use crate::identity::AuthenticatedUser;

impl AuthenticatedUser {
    /// Sign arbitrary bytes with ES256.
    pub fn sign_data(&self, data: &[u8]) -> Result<Jws> {
        Jws::sign(data, self.signing_key()).map_err(signing_error)
    }

    /// Attest an access log. Only meaningful when this user is a monitor:
    /// receivers reject logs whose signer is not.
    pub fn sign_log(&self, log: &AccessLog) -> Result<SignedLog> {
        SignedLog::sign(log, self.signing_key()).map_err(signing_error)
    }
}

pub(crate) fn signing_error(err: CoreError) -> ItCryptoError {
    match err {
        CoreError::EncodingError(_) => {
            ItCryptoError::serialization("Could not serialize data to sign").with_source(err)
        }
        other => ItCryptoError::signature("Could not sign data").with_source(other),
    }
}
