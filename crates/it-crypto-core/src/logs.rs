//! The access log data model and its signed envelopes.
//!
//! An [`AccessLog`] is attested by its monitor and travels as a
//! [`SignedLog`]. Every act of sharing wraps the signed log in a
//! [`SharedLog`] that names the forwarder and the intended recipients, and
//! signs that too, giving a [`SignedSharedLog`].

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_json, from_json};
use crate::crypto::{SigningKey, VerifyingKey};
use crate::error::Result;
use crate::jws::Jws;

/// A record of a monitor accessing an owner's data.
///
/// Field order is the JSON field order, which is what gets signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    /// Identity that performed the access and attests to it.
    pub monitor: String,

    /// Identity whose data was accessed.
    pub owner: String,

    /// Tool used for the access.
    pub tool: String,

    /// Why the access happened.
    pub justification: String,

    /// When the access happened.
    pub timestamp: i64,

    /// Kind of access, e.g. "direct" or "aggregate".
    pub access_kind: String,

    /// Categories of data touched, in order.
    pub data_type: Vec<String>,
}

impl AccessLog {
    /// Parse an access log from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        from_json(bytes)
    }

    /// Serialize to canonical JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        canonical_json(self)
    }
}

/// One act of sharing: `creator` discloses `log` to exactly `recipients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLog {
    /// The monitor-signed log being shared.
    pub log: SignedLog,

    /// Recipient identities, in the order the sharer listed them.
    pub recipients: Vec<String>,

    /// Identity forwarding the log.
    pub creator: String,
}

impl SharedLog {
    /// Whether `id` is one of the recipients.
    pub fn is_recipient(&self, id: &str) -> bool {
        self.recipients.iter().any(|r| r == id)
    }
}

/// A JWS whose payload is the JSON of a `T`.
///
/// The type parameter keeps the two signed roles apart: a [`SignedLog`]
/// cannot be passed where a [`SignedSharedLog`] is expected. On the wire both
/// are the plain JWS JSON object.
#[derive(Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct Signed<T> {
    jws: Jws,
    #[serde(skip)]
    _payload: PhantomData<fn() -> T>,
}

/// An [`AccessLog`] signed by its monitor.
pub type SignedLog = Signed<AccessLog>;

/// A [`SharedLog`] signed by its creator.
pub type SignedSharedLog = Signed<SharedLog>;

impl<T> Signed<T> {
    /// Wrap a JWS that is expected to carry a `T`. Nothing is checked.
    pub fn from_jws(jws: Jws) -> Self {
        Self {
            jws,
            _payload: PhantomData,
        }
    }

    /// Parse from the JWS JSON or compact serialization.
    pub fn parse(input: &str) -> Result<Self> {
        Jws::parse(input).map(Self::from_jws)
    }

    /// The underlying JWS.
    pub fn jws(&self) -> &Jws {
        &self.jws
    }

    /// The JWS JSON serialization.
    pub fn to_json(&self) -> Result<String> {
        self.jws.to_json()
    }
}

impl<T: Serialize> Signed<T> {
    /// Serialize `value` to canonical JSON and sign it with ES256.
    pub fn sign(value: &T, key: &SigningKey) -> Result<Self> {
        let payload = canonical_json(value)?;
        Jws::sign(&payload, key).map(Self::from_jws)
    }
}

impl<T: DeserializeOwned> Signed<T> {
    /// Decode the payload WITHOUT verifying the signature.
    ///
    /// Only use the result to decide whose key to verify with.
    pub fn peek(&self) -> Result<T> {
        from_json(&self.jws.unverified_payload()?)
    }

    /// Verify the signature with `key`, then decode the payload.
    pub fn verify(&self, key: &VerifyingKey) -> Result<T> {
        from_json(&self.jws.verify(key)?)
    }
}

impl<T> Clone for Signed<T> {
    fn clone(&self) -> Self {
        Self::from_jws(self.jws.clone())
    }
}

impl<T> PartialEq for Signed<T> {
    fn eq(&self, other: &Self) -> bool {
        self.jws == other.jws
    }
}

impl<T> Eq for Signed<T> {}

impl<T> fmt::Debug for Signed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signed").field(&self.jws).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::b64_decode;

    fn sample() -> AccessLog {
        AccessLog {
            monitor: "m".into(),
            owner: "o".into(),
            tool: "t".into(),
            justification: "j".into(),
            timestamp: 30,
            access_kind: "direct".into(),
            data_type: vec!["Email".into()],
        }
    }

    #[test]
    fn test_access_log_json_shape() {
        let json = String::from_utf8(sample().to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"monitor":"m","owner":"o","tool":"t","justification":"j","timestamp":30,"accessKind":"direct","dataType":["Email"]}"#
        );
        assert_eq!(AccessLog::from_json(json.as_bytes()).unwrap(), sample());
    }

    #[test]
    fn test_sign_verify_access_log() {
        let key = SigningKey::generate();
        let signed = SignedLog::sign(&sample(), &key).unwrap();

        assert_eq!(signed.verify(&key.verifying_key()).unwrap(), sample());
        assert_eq!(signed.peek().unwrap(), sample());
        assert!(signed
            .verify(&SigningKey::generate().verifying_key())
            .is_err());
    }

    #[test]
    fn test_signed_serializes_as_plain_jws() {
        let key = SigningKey::generate();
        let signed = SignedLog::sign(&sample(), &key).unwrap();

        let json = serde_json::to_value(&signed).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("payload"));
        assert!(obj.contains_key("signature"));
        assert!(obj.contains_key("protected"));
        assert!(!obj.contains_key("header"));

        let back: SignedLog = serde_json::from_value(json).unwrap();
        assert_eq!(back, signed);
    }

    #[test]
    fn test_shared_log_nests_signed_log() {
        let key = SigningKey::generate();
        let shared = SharedLog {
            log: SignedLog::sign(&sample(), &key).unwrap(),
            recipients: vec!["o".into(), "r".into()],
            creator: "o".into(),
        };
        assert!(shared.is_recipient("r"));
        assert!(!shared.is_recipient("u"));

        let signed = SignedSharedLog::sign(&shared, &key).unwrap();
        let payload = b64_decode(&signed.jws().payload).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["creator"], "o");
        assert_eq!(value["recipients"][1], "r");
        assert!(value["log"]["payload"].is_string());

        let verified = signed.verify(&key.verifying_key()).unwrap();
        assert_eq!(verified.log.peek().unwrap(), sample());
    }

    #[test]
    fn test_parse_accepts_compact() {
        let key = SigningKey::generate();
        let signed = SignedLog::sign(&sample(), &key).unwrap();
        let compact = signed.jws().to_compact();

        let parsed = SignedLog::parse(&compact).unwrap();
        assert_eq!(parsed.verify(&key.verifying_key()).unwrap(), sample());
    }
}
