//! Identities.
//!
//! A [`RemoteUser`] is what everyone may know about a participant: its id,
//! the public key others encrypt to and the public key its signatures verify
//! under. An [`AuthenticatedUser`] additionally holds the two private keys,
//! which is what is needed to sign, share and decrypt.
//!
//! Whether a user may attest access logs (`is_monitor`) is not part of any
//! certificate. It is assigned by whoever hands out identities, typically
//! the [`UserResolver`](crate::UserResolver).

use std::ops::Deref;

use uuid::Uuid;

use it_crypto_core::{DecryptionKey, EncryptionKey, SigningKey, VerifyingKey};

use crate::error::{ItCryptoError, Result};
use crate::pki::{decryption_key_from_pem, signing_key_from_pem, EcCertificate};

const ENCRYPTION_CERTIFICATE: &str = "encryption certificate";
const VERIFICATION_CERTIFICATE: &str = "verification certificate";

/// The public identity of a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    id: String,
    encryption_certificate: EncryptionKey,
    verification_certificate: VerifyingKey,
    is_monitor: bool,
}

impl RemoteUser {
    /// Assemble an identity from already trusted keys.
    pub fn new(
        id: impl Into<String>,
        encryption_certificate: EncryptionKey,
        verification_certificate: VerifyingKey,
        is_monitor: bool,
    ) -> Self {
        Self {
            id: id.into(),
            encryption_certificate,
            verification_certificate,
            is_monitor,
        }
    }

    /// Import an identity from PEM certificates.
    ///
    /// Both certificates must be signed by `trusted_certificate`, the PEM of
    /// the CA.
    pub fn import(
        id: impl Into<String>,
        encryption_certificate: &str,
        verification_certificate: &str,
        is_monitor: bool,
        trusted_certificate: &str,
    ) -> Result<Self> {
        let ca = EcCertificate::from_pem(trusted_certificate, "trusted certificate")?;

        let enc = EcCertificate::from_pem(encryption_certificate, ENCRYPTION_CERTIFICATE)?;
        enc.verify_issued_by(&ca, ENCRYPTION_CERTIFICATE)?;

        let vrf = EcCertificate::from_pem(verification_certificate, VERIFICATION_CERTIFICATE)?;
        vrf.verify_issued_by(&ca, VERIFICATION_CERTIFICATE)?;

        Ok(Self::new(
            id,
            enc.encryption_key(ENCRYPTION_CERTIFICATE)?,
            vrf.verifying_key(VERIFICATION_CERTIFICATE)?,
            is_monitor,
        ))
    }

    /// A throwaway identity with fresh keys and a random id. Not monitor.
    pub fn generate() -> Self {
        AuthenticatedUser::generate(None).remote()
    }

    /// Set the monitor privilege.
    pub fn with_monitor(mut self, is_monitor: bool) -> Self {
        self.is_monitor = is_monitor;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key that content for this user is wrapped to.
    pub fn encryption_certificate(&self) -> &EncryptionKey {
        &self.encryption_certificate
    }

    /// Key this user's signatures verify under.
    pub fn verification_certificate(&self) -> &VerifyingKey {
        &self.verification_certificate
    }

    /// Whether signatures of this user over access logs are trusted.
    pub fn is_monitor(&self) -> bool {
        self.is_monitor
    }
}

/// A participant holding its private keys.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    remote: RemoteUser,
    decryption_key: DecryptionKey,
    signing_key: SigningKey,
}

impl AuthenticatedUser {
    /// Fresh key pairs for encryption and signing. Without an `id` a random
    /// UUID is used.
    pub fn generate(id: Option<&str>) -> Self {
        let id = id.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        let decryption_key = DecryptionKey::generate();
        let signing_key = SigningKey::generate();

        Self {
            remote: RemoteUser::new(
                id,
                decryption_key.encryption_key(),
                signing_key.verifying_key(),
                false,
            ),
            decryption_key,
            signing_key,
        }
    }

    /// Import the own identity from PEM certificates and PKCS#8 keys.
    ///
    /// The certificates are not checked against a CA: this is the caller's
    /// own identity. Each private key must belong to its certificate.
    pub fn import(
        id: impl Into<String>,
        encryption_certificate: &str,
        verification_certificate: &str,
        decryption_key: &str,
        signing_key: &str,
    ) -> Result<Self> {
        let enc = EcCertificate::from_pem(encryption_certificate, ENCRYPTION_CERTIFICATE)?
            .encryption_key(ENCRYPTION_CERTIFICATE)?;
        let vrf = EcCertificate::from_pem(verification_certificate, VERIFICATION_CERTIFICATE)?
            .verifying_key(VERIFICATION_CERTIFICATE)?;
        let decryption_key = decryption_key_from_pem(decryption_key)?;
        let signing_key = signing_key_from_pem(signing_key)?;

        if decryption_key.encryption_key() != enc {
            return Err(ItCryptoError::parse(
                "decryption key does not belong to the encryption certificate",
            ));
        }
        if signing_key.verifying_key() != vrf {
            return Err(ItCryptoError::parse(
                "signing key does not belong to the verification certificate",
            ));
        }

        Ok(Self {
            remote: RemoteUser::new(id, enc, vrf, false),
            decryption_key,
            signing_key,
        })
    }

    /// Set the monitor privilege.
    pub fn with_monitor(mut self, is_monitor: bool) -> Self {
        self.remote.is_monitor = is_monitor;
        self
    }

    /// The public half of this identity.
    pub fn remote(&self) -> RemoteUser {
        self.remote.clone()
    }

    pub(crate) fn decryption_key(&self) -> &DecryptionKey {
        &self.decryption_key
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl Deref for AuthenticatedUser {
    type Target = RemoteUser;

    fn deref(&self) -> &RemoteUser {
        &self.remote
    }
}
