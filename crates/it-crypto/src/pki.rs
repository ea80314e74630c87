//! PEM and X.509 handling.
//!
//! Certificates only serve as carriers of P-256 public keys whose provenance
//! is vouched for by a CA. A leaf is accepted when its issuer name equals
//! the anchor's subject, a v3 anchor is marked as a CA in its basic
//! constraints, and the anchor's ecdsa-with-SHA256 signature over the
//! to-be-signed certificate verifies. Validity periods, other extensions
//! and longer chains are not inspected.

use x509_cert::certificate::Version;
use x509_cert::der::{Decode, Encode};
use x509_cert::ext::pkix::BasicConstraints;
use x509_cert::spki::ObjectIdentifier;
use x509_cert::Certificate;

use it_crypto_core::{DecryptionKey, EncryptionKey, SigningKey, VerifyingKey};

use crate::error::{ItCryptoError, Result};

/// ecdsa-with-SHA256 (RFC 5758).
const ECDSA_WITH_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

/// id-ecPublicKey (RFC 5480).
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

const CERTIFICATE_TAG: &str = "CERTIFICATE";
const PRIVATE_KEY_TAG: &str = "PRIVATE KEY";

/// A decoded X.509 certificate carrying an EC public key.
#[derive(Debug, Clone)]
pub struct EcCertificate(Certificate);

impl EcCertificate {
    /// Decode a PEM `CERTIFICATE` block. `what` names the input in errors.
    pub fn from_pem(input: &str, what: &str) -> Result<Self> {
        let der = pem_contents(input, CERTIFICATE_TAG, what)?;
        let cert = Certificate::from_der(&der).map_err(|e| {
            ItCryptoError::parse(format!("Can not parse {what}")).with_source(e)
        })?;

        let algorithm = &cert.tbs_certificate.subject_public_key_info.algorithm;
        if algorithm.oid != EC_PUBLIC_KEY {
            return Err(ItCryptoError::parse(format!(
                "{what} does not carry an EC public key (algorithm {})",
                algorithm.oid
            )));
        }
        Ok(Self(cert))
    }

    /// Uncompressed SEC1 encoding of the subject public key.
    fn public_key_bytes(&self, what: &str) -> Result<&[u8]> {
        self.0
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| ItCryptoError::parse(format!("{what} has a malformed public key")))
    }

    /// The subject key, for key agreement.
    pub fn encryption_key(&self, what: &str) -> Result<EncryptionKey> {
        EncryptionKey::from_sec1_bytes(self.public_key_bytes(what)?).map_err(|e| {
            ItCryptoError::parse(format!("{what} does not carry a P-256 key")).with_source(e)
        })
    }

    /// The subject key, for signature verification.
    pub fn verifying_key(&self, what: &str) -> Result<VerifyingKey> {
        VerifyingKey::from_sec1_bytes(self.public_key_bytes(what)?).map_err(|e| {
            ItCryptoError::parse(format!("{what} does not carry a P-256 key")).with_source(e)
        })
    }

    /// Whether this certificate may issue others. Certificates older than
    /// v3 carry no extensions and are taken as they are.
    fn may_issue(&self) -> bool {
        let tbs = &self.0.tbs_certificate;
        if tbs.version != Version::V3 {
            return true;
        }
        matches!(tbs.get::<BasicConstraints>(), Ok(Some((_, constraints))) if constraints.ca)
    }

    /// Check that `issuer` issued and signed this certificate.
    pub fn verify_issued_by(&self, issuer: &EcCertificate, what: &str) -> Result<()> {
        let untrusted = || ItCryptoError::trust(format!("Can not verify {what}"));

        if self.0.tbs_certificate.issuer != issuer.0.tbs_certificate.subject {
            tracing::debug!(what, "issuer name does not match the trusted subject");
            return Err(untrusted());
        }
        if !issuer.may_issue() {
            tracing::debug!(what, "trusted certificate is not a CA");
            return Err(untrusted());
        }

        if self.0.signature_algorithm.oid != ECDSA_WITH_SHA256 {
            return Err(ItCryptoError::trust(format!(
                "{what} is signed with unsupported algorithm {}",
                self.0.signature_algorithm.oid
            )));
        }

        let issuer_key = issuer.verifying_key("trusted certificate")?;
        let tbs = self
            .0
            .tbs_certificate
            .to_der()
            .map_err(|e| ItCryptoError::parse(format!("Can not encode {what}")).with_source(e))?;
        let signature = self.0.signature.as_bytes().ok_or_else(untrusted)?;

        issuer_key
            .verify_der(&tbs, signature)
            .map_err(|e| untrusted().with_source(e))
    }
}

/// Decode a PEM `PRIVATE KEY` (PKCS#8) block into a decryption key.
pub fn decryption_key_from_pem(input: &str) -> Result<DecryptionKey> {
    let der = pem_contents(input, PRIVATE_KEY_TAG, "decryption key")?;
    DecryptionKey::from_pkcs8_der(&der)
        .map_err(|e| ItCryptoError::parse("Can not parse decryption key").with_source(e))
}

/// Decode a PEM `PRIVATE KEY` (PKCS#8) block into a signing key.
pub fn signing_key_from_pem(input: &str) -> Result<SigningKey> {
    let der = pem_contents(input, PRIVATE_KEY_TAG, "signing key")?;
    SigningKey::from_pkcs8_der(&der)
        .map_err(|e| ItCryptoError::parse("Can not parse signing key").with_source(e))
}

fn pem_contents(input: &str, tag: &str, what: &str) -> Result<Vec<u8>> {
    let block = pem::parse(input)
        .map_err(|e| ItCryptoError::parse(format!("Can not decode PEM of {what}")).with_source(e))?;
    if block.tag() != tag {
        return Err(ItCryptoError::parse(format!(
            "expected a PEM {tag} block for {what}, got {}",
            block.tag()
        )));
    }
    Ok(block.into_contents())
}
