//! Cryptographic key types for it-crypto.
//!
//! Wraps P-256 signing (ECDSA/SHA-256) and key agreement (ECDH) keys with
//! strong types, so a signing key can never be used where a decryption key is
//! expected and vice versa.

use std::fmt;

use p256::ecdsa::signature::{RandomizedSigner, Verifier};
use p256::ecdsa::{
    Signature, SigningKey as EcdsaSigningKey, VerifyingKey as EcdsaVerifyingKey,
};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::DecodePrivateKey;
use p256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, Result};

/// Size of one P-256 affine coordinate in bytes.
pub const COORDINATE_SIZE: usize = 32;

/// Size of a fixed-width (r || s) ES256 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// Short SHA-256 fingerprint of an uncompressed SEC1 point, for logs and `Debug`.
fn fingerprint(sec1: &[u8]) -> String {
    let digest = Sha256::digest(sec1);
    hex::encode(&digest[..8])
}

/// A P-256 public key that verifies ES256 signatures.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(EcdsaVerifyingKey);

impl VerifyingKey {
    /// Parse from a SEC1 encoded point (compressed or uncompressed).
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        EcdsaVerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CoreError::InvalidKey("not a P-256 point".into()))
    }

    /// Uncompressed SEC1 encoding of the key.
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Verify a fixed-width (r || s) signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        if signature.len() != SIGNATURE_SIZE {
            return Err(CoreError::InvalidSignature);
        }
        let sig = Signature::from_slice(signature).map_err(|_| CoreError::InvalidSignature)?;
        self.0
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }

    /// Verify an ASN.1 DER encoded signature over `message`.
    ///
    /// X.509 certificates carry their signatures in this form.
    pub fn verify_der(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let sig = Signature::from_der(signature).map_err(|_| CoreError::InvalidSignature)?;
        self.0
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }

    /// Hex fingerprint of the key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.to_sec1_bytes())
    }
}

impl From<PublicKey> for VerifyingKey {
    fn from(key: PublicKey) -> Self {
        Self(EcdsaVerifyingKey::from(key))
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", self.fingerprint())
    }
}

/// A P-256 private key that produces ES256 signatures.
#[derive(Clone)]
pub struct SigningKey(EcdsaSigningKey);

impl SigningKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self(EcdsaSigningKey::random(&mut OsRng))
    }

    /// Parse from a PKCS#8 DER document.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_pkcs8_der(der)
            .map_err(|e| CoreError::InvalidKey(format!("PKCS#8: {e}")))?;
        Ok(Self(EcdsaSigningKey::from(secret)))
    }

    /// The matching public key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key().clone())
    }

    /// Sign a message, returning the fixed-width (r || s) signature.
    ///
    /// Signatures are hedged with fresh randomness, so two signatures over the
    /// same message differ while both verify.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        let sig: Signature = self.0.sign_with_rng(&mut OsRng, message);
        let mut out = [0u8; SIGNATURE_SIZE];
        out.copy_from_slice(&sig.to_bytes());
        out
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey({:?})", self.verifying_key())
    }
}

/// A P-256 public key that content keys are wrapped to.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey(PublicKey);

impl EncryptionKey {
    /// Parse from a SEC1 encoded point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CoreError::InvalidKey("not a P-256 point".into()))
    }

    /// Build from affine coordinates, as found in a JWK.
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Result<Self> {
        if x.len() != COORDINATE_SIZE || y.len() != COORDINATE_SIZE {
            return Err(CoreError::InvalidKey(format!(
                "expected {COORDINATE_SIZE}-byte coordinates, got {} and {}",
                x.len(),
                y.len()
            )));
        }
        let mut sec1 = Vec::with_capacity(1 + 2 * COORDINATE_SIZE);
        sec1.push(0x04);
        sec1.extend_from_slice(x);
        sec1.extend_from_slice(y);
        Self::from_sec1_bytes(&sec1)
    }

    /// Affine coordinates `(x, y)` of the point.
    pub fn coordinates(&self) -> ([u8; COORDINATE_SIZE], [u8; COORDINATE_SIZE]) {
        let point = self.0.to_encoded_point(false);
        let bytes = point.as_bytes();
        let mut x = [0u8; COORDINATE_SIZE];
        let mut y = [0u8; COORDINATE_SIZE];
        x.copy_from_slice(&bytes[1..1 + COORDINATE_SIZE]);
        y.copy_from_slice(&bytes[1 + COORDINATE_SIZE..]);
        (x, y)
    }

    /// Uncompressed SEC1 encoding of the key.
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        self.0.to_encoded_point(false).as_bytes().to_vec()
    }

    /// The underlying curve point.
    pub fn as_public_key(&self) -> &PublicKey {
        &self.0
    }

    /// Hex fingerprint of the key.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.to_sec1_bytes())
    }
}

impl From<PublicKey> for EncryptionKey {
    fn from(key: PublicKey) -> Self {
        Self(key)
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKey({})", self.fingerprint())
    }
}

/// A P-256 private key that unwraps content keys.
#[derive(Clone)]
pub struct DecryptionKey(SecretKey);

impl DecryptionKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self(SecretKey::random(&mut OsRng))
    }

    /// Parse from a PKCS#8 DER document.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        SecretKey::from_pkcs8_der(der)
            .map(Self)
            .map_err(|e| CoreError::InvalidKey(format!("PKCS#8: {e}")))
    }

    /// The matching public key.
    pub fn encryption_key(&self) -> EncryptionKey {
        EncryptionKey(self.0.public_key())
    }

    /// Static-ephemeral ECDH: the x-coordinate of `self * peer`.
    pub fn diffie_hellman(&self, peer: &EncryptionKey) -> [u8; COORDINATE_SIZE] {
        let shared = p256::ecdh::diffie_hellman(self.0.to_nonzero_scalar(), peer.0.as_affine());
        let mut out = [0u8; COORDINATE_SIZE];
        out.copy_from_slice(shared.raw_secret_bytes());
        out
    }
}

impl fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecryptionKey({:?})", self.encryption_key())
    }
}
