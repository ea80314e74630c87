//! JSON Web Signatures (RFC 7515), restricted to ES256.
//!
//! A [`Jws`] is the structured single-signature form
//! `{payload, signature, header?, protected}`. The signing input is
//! `ASCII(protected || '.' || payload)` where both parts are base64url, so a
//! parsed envelope verifies against the exact strings it was produced with,
//! independent of how its JSON is re-serialized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::{b64_decode, b64_encode, b64_json, canonical_json};
use crate::crypto::{SigningKey, VerifyingKey};
use crate::error::{CoreError, Result};

/// JWS algorithm identifier for ECDSA P-256 with SHA-256.
pub const ES256: &str = "ES256";

/// A single-signature JWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jws {
    /// base64url payload.
    pub payload: String,

    /// base64url signature.
    pub signature: String,

    /// Unprotected header, if any. Never consulted for verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Value>,

    /// base64url protected header.
    pub protected: String,
}

/// The protected header of a JWS.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProtectedHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crit: Option<Vec<String>>,
}

/// Any of the JSON shapes a single-signature JWS may arrive in.
#[derive(Deserialize)]
struct RawJws {
    payload: String,
    #[serde(default)]
    signature: Option<String>,
    #[serde(default)]
    header: Option<Value>,
    #[serde(default)]
    protected: Option<String>,
    #[serde(default)]
    signatures: Option<Vec<RawSignature>>,
}

#[derive(Deserialize)]
struct RawSignature {
    signature: String,
    #[serde(default)]
    header: Option<Value>,
    #[serde(default)]
    protected: Option<String>,
}

impl Jws {
    /// Sign `payload` with ES256.
    pub fn sign(payload: &[u8], key: &SigningKey) -> Result<Self> {
        let header = ProtectedHeader {
            alg: ES256.to_string(),
            crit: None,
        };
        let protected = b64_encode(canonical_json(&header)?);
        let payload = b64_encode(payload);
        let signing_input = format!("{protected}.{payload}");
        let signature = b64_encode(key.sign(signing_input.as_bytes()));

        Ok(Self {
            payload,
            signature,
            header: None,
            protected,
        })
    }

    /// Parse a JWS from its JSON serialization (flattened, or general with
    /// exactly one signature) or from its compact serialization.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.starts_with('{') {
            Self::from_json(trimmed.as_bytes())
        } else {
            Self::from_compact(trimmed)
        }
    }

    /// Parse the JSON serialization.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: RawJws =
            serde_json::from_slice(bytes).map_err(|e| CoreError::MalformedJws(e.to_string()))?;

        if let Some(mut signatures) = raw.signatures {
            if signatures.len() != 1 {
                return Err(CoreError::MalformedJws(format!(
                    "expected exactly one signature, got {}",
                    signatures.len()
                )));
            }
            let sig = signatures.remove(0);
            return Ok(Self {
                payload: raw.payload,
                signature: sig.signature,
                header: sig.header,
                protected: sig
                    .protected
                    .ok_or_else(|| CoreError::MalformedJws("missing protected header".into()))?,
            });
        }

        Ok(Self {
            payload: raw.payload,
            signature: raw
                .signature
                .ok_or_else(|| CoreError::MalformedJws("missing signature".into()))?,
            header: raw.header,
            protected: raw
                .protected
                .ok_or_else(|| CoreError::MalformedJws("missing protected header".into()))?,
        })
    }

    /// Parse the compact serialization `protected.payload.signature`.
    pub fn from_compact(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 3 {
            return Err(CoreError::MalformedJws(format!(
                "compact JWS needs 3 parts, got {}",
                parts.len()
            )));
        }
        Ok(Self {
            protected: parts[0].to_string(),
            payload: parts[1].to_string(),
            signature: parts[2].to_string(),
            header: None,
        })
    }

    /// Serialize to the flattened JSON serialization.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Serialize to the compact serialization. Drops any unprotected header.
    pub fn to_compact(&self) -> String {
        format!("{}.{}.{}", self.protected, self.payload, self.signature)
    }

    /// Decode the payload without checking the signature.
    ///
    /// The result must not be trusted; it is only fit to decide which key to
    /// verify with.
    pub fn unverified_payload(&self) -> Result<Vec<u8>> {
        b64_decode(&self.payload)
    }

    /// Verify the signature and return the payload bytes.
    pub fn verify(&self, key: &VerifyingKey) -> Result<Vec<u8>> {
        let header: ProtectedHeader = b64_json(&self.protected)
            .map_err(|e| CoreError::MalformedJws(format!("protected header: {e}")))?;

        if header.alg != ES256 {
            return Err(CoreError::UnsupportedAlgorithm(header.alg));
        }
        if let Some(crit) = header.crit {
            return Err(CoreError::UnsupportedAlgorithm(format!(
                "critical header parameters {crit:?}"
            )));
        }

        let signature = b64_decode(&self.signature)?;
        let signing_input = format!("{}.{}", self.protected, self.payload);
        key.verify(signing_input.as_bytes(), &signature)?;

        self.unverified_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify() {
        let key = SigningKey::generate();
        let jws = Jws::sign(b"{\"a\":1}", &key).unwrap();

        let payload = jws.verify(&key.verifying_key()).unwrap();
        assert_eq!(payload, b"{\"a\":1}");
    }

    #[test]
    fn test_protected_header_is_es256() {
        let key = SigningKey::generate();
        let jws = Jws::sign(b"x", &key).unwrap();
        assert_eq!(b64_decode(&jws.protected).unwrap(), br#"{"alg":"ES256"}"#);
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = SigningKey::generate();
        let other = SigningKey::generate();
        let jws = Jws::sign(b"payload", &key).unwrap();

        assert!(matches!(
            jws.verify(&other.verifying_key()),
            Err(CoreError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let key = SigningKey::generate();
        let mut jws = Jws::sign(b"payload", &key).unwrap();
        jws.payload = b64_encode(b"forged");

        assert!(jws.verify(&key.verifying_key()).is_err());
        // The peek still works, which is why it must never be trusted.
        assert_eq!(jws.unverified_payload().unwrap(), b"forged");
    }

    #[test]
    fn test_alg_none_rejected() {
        let key = SigningKey::generate();
        let mut jws = Jws::sign(b"payload", &key).unwrap();
        jws.protected = b64_encode(br#"{"alg":"none"}"#);

        assert!(matches!(
            jws.verify(&key.verifying_key()),
            Err(CoreError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_json_and_compact_forms() {
        let key = SigningKey::generate();
        let jws = Jws::sign(b"payload", &key).unwrap();

        let json = jws.to_json().unwrap();
        assert!(!json.contains("header"));
        assert_eq!(Jws::parse(&json).unwrap(), jws);
        assert_eq!(Jws::parse(&jws.to_compact()).unwrap(), jws);
    }

    #[test]
    fn test_general_serialization_with_one_signature() {
        let key = SigningKey::generate();
        let jws = Jws::sign(b"payload", &key).unwrap();
        let general = format!(
            r#"{{"payload":"{}","signatures":[{{"protected":"{}","signature":"{}"}}]}}"#,
            jws.payload, jws.protected, jws.signature
        );

        let parsed = Jws::parse(&general).unwrap();
        assert_eq!(parsed.verify(&key.verifying_key()).unwrap(), b"payload");
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(Jws::parse("not-a-jws").is_err());
        assert!(Jws::parse(r#"{"payload":"eA"}"#).is_err());
        assert!(Jws::parse(r#"{"payload":"eA","signatures":[]}"#).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn signed_payload_verifies_and_is_bound(
                payload in prop::collection::vec(any::<u8>(), 0..128),
                extra in any::<u8>(),
            ) {
                let key = SigningKey::generate();
                let jws = Jws::sign(&payload, &key).unwrap();
                prop_assert_eq!(jws.verify(&key.verifying_key()).unwrap(), payload.clone());

                let mut forged = jws.clone();
                let mut altered = payload;
                altered.push(extra);
                forged.payload = b64_encode(&altered);
                prop_assert!(forged.verify(&key.verifying_key()).is_err());
            }
        }
    }
}
