//! Key sharing via ECDH-ES+A256KW (RFC 7518 §4.6).
//!
//! The content key of an envelope is wrapped once per recipient. For each
//! recipient the sender generates a fresh ephemeral P-256 key, agrees a
//! secret with the recipient's encryption key, derives a key-encryption key
//! with the Concat KDF and wraps the content key with AES key wrap. The
//! ephemeral public key travels in the recipient's header as `epk`.

use serde::{Deserialize, Serialize};

use it_crypto_core::{b64_decode, b64_encode, DecryptionKey, EncryptionKey};

use crate::crypto::{ContentKey, KeyEncryptionKey};
use crate::error::{PermsError, Result};

/// JWE key management algorithm identifier.
pub const ECDH_ES_A256KW: &str = "ECDH-ES+A256KW";

/// A public P-256 key as a JSON Web Key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

impl EcJwk {
    /// Encode a public key.
    pub fn from_key(key: &EncryptionKey) -> Self {
        let (x, y) = key.coordinates();
        Self {
            kty: "EC".into(),
            crv: "P-256".into(),
            x: b64_encode(x),
            y: b64_encode(y),
        }
    }

    /// Decode into a public key, rejecting other key types and curves.
    pub fn to_key(&self) -> Result<EncryptionKey> {
        if self.kty != "EC" || self.crv != "P-256" {
            return Err(PermsError::UnsupportedAlgorithm(format!(
                "epk must be an EC P-256 key, got kty={} crv={}",
                self.kty, self.crv
            )));
        }
        let x = b64_decode(&self.x)?;
        let y = b64_decode(&self.y)?;
        Ok(EncryptionKey::from_coordinates(&x, &y)?)
    }
}

/// A content key wrapped for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShare {
    /// Sender's ephemeral public key.
    pub epk: EncryptionKey,

    /// The content key, wrapped with the derived key-encryption key.
    pub encrypted_key: Vec<u8>,
}

impl KeyShare {
    /// Wrap `content_key` for the holder of `recipient`.
    pub fn create(content_key: &ContentKey, recipient: &EncryptionKey) -> Result<Self> {
        let ephemeral = DecryptionKey::generate();
        let z = ephemeral.diffie_hellman(recipient);
        let kek = KeyEncryptionKey::derive(&z, ECDH_ES_A256KW, b"", b"");

        Ok(Self {
            epk: ephemeral.encryption_key(),
            encrypted_key: kek.wrap(content_key)?,
        })
    }

    /// Recover the content key with the recipient's private key.
    ///
    /// `apu` and `apv` are the decoded agreement PartyUInfo/PartyVInfo from
    /// the header, empty when absent.
    pub fn open(&self, recipient: &DecryptionKey, apu: &[u8], apv: &[u8]) -> Result<ContentKey> {
        let z = recipient.diffie_hellman(&self.epk);
        let kek = KeyEncryptionKey::derive(&z, ECDH_ES_A256KW, apu, apv);
        kek.unwrap(&self.encrypted_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyshare_roundtrip() {
        let recipient = DecryptionKey::generate();
        let content_key = ContentKey::generate();

        let share = KeyShare::create(&content_key, &recipient.encryption_key()).unwrap();
        let opened = share.open(&recipient, b"", b"").unwrap();

        assert_eq!(opened, content_key);
    }

    #[test]
    fn test_keyshare_wrong_recipient_fails() {
        let recipient = DecryptionKey::generate();
        let wrong = DecryptionKey::generate();
        let share = KeyShare::create(&ContentKey::generate(), &recipient.encryption_key()).unwrap();

        assert!(share.open(&wrong, b"", b"").is_err());
    }

    #[test]
    fn test_fresh_ephemeral_per_share() {
        let recipient = DecryptionKey::generate().encryption_key();
        let content_key = ContentKey::generate();

        let a = KeyShare::create(&content_key, &recipient).unwrap();
        let b = KeyShare::create(&content_key, &recipient).unwrap();
        assert_ne!(a.epk, b.epk);
        assert_ne!(a.encrypted_key, b.encrypted_key);
    }

    #[test]
    fn test_jwk_roundtrip_and_shape() {
        let key = DecryptionKey::generate().encryption_key();
        let jwk = EcJwk::from_key(&key);

        let json = serde_json::to_value(&jwk).unwrap();
        assert_eq!(json["kty"], "EC");
        assert_eq!(json["crv"], "P-256");
        assert_eq!(jwk.x.len(), 43);

        assert_eq!(jwk.to_key().unwrap(), key);
    }

    #[test]
    fn test_jwk_rejects_other_curves() {
        let mut jwk = EcJwk::from_key(&DecryptionKey::generate().encryption_key());
        jwk.crv = "P-384".into();
        assert!(matches!(
            jwk.to_key(),
            Err(PermsError::UnsupportedAlgorithm(_))
        ));
    }
}
