//! Multi-recipient encrypted envelope (JWE, RFC 7516).
//!
//! One A256GCM ciphertext, one wrapped content key per recipient. The
//! protected header is authenticated as additional data and carries the
//! sharing claims `recipients` and `owner`; those two are only ever read from
//! the protected header.
//!
//! Envelopes are written in the general JSON serialization. Parsing also
//! accepts the flattened form and the header layouts other JOSE libraries
//! produce (`epk` in the protected header, a top-level `encrypted_key`
//! alongside `recipients`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use it_crypto_core::{b64_decode, b64_encode, canonical_json, DecryptionKey, EncryptionKey};

use crate::crypto::{ContentIv, ContentKey};
use crate::error::{PermsError, Result};
use crate::keyshare::{EcJwk, KeyShare, ECDH_ES_A256KW};
use crate::policy::HeaderClaims;

/// JWE content encryption algorithm identifier.
pub const A256GCM: &str = "A256GCM";

/// Header parameters that only count when integrity protected.
const PROTECTED_ONLY: [&str; 2] = ["recipients", "owner"];

/// The JOSE header parameters this implementation reads or writes.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoseHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc: Option<String>,

    /// Ids the content is shared with, as claimed by the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<String>>,

    /// Owner of the shared log, as claimed by the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epk: Option<EcJwk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apu: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apv: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit: Option<Vec<String>>,
}

impl JoseHeader {
    fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(PermsError::SerializationError(
                "header did not serialize to an object".into(),
            )),
            Err(e) => Err(PermsError::SerializationError(e.to_string())),
        }
    }

    fn from_map(map: Map<String, Value>) -> Result<Self> {
        serde_json::from_value(Value::Object(map))
            .map_err(|e| PermsError::MalformedEnvelope(format!("header: {e}")))
    }
}

/// One entry of the `recipients` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientEntry {
    /// Per-recipient unprotected header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Map<String, Value>>,

    /// base64url wrapped content key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<String>,
}

/// Every member a JSON-serialized JWE may have, general or flattened.
#[derive(Debug, Serialize, Deserialize)]
struct JweJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unprotected: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    header: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipients: Option<Vec<RecipientEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aad: Option<String>,
    iv: String,
    ciphertext: String,
    tag: String,
}

/// A parsed or freshly built JWE.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// base64url protected header, exactly as received.
    protected: String,
    /// Decoded protected header members.
    protected_fields: Map<String, Value>,
    /// Typed view of the protected header.
    protected_header: JoseHeader,
    unprotected: Option<Map<String, Value>>,
    recipients: Vec<RecipientEntry>,
    aad: Option<String>,
    iv: String,
    ciphertext: String,
    tag: String,
}

impl Envelope {
    /// Parse a JWE from its general or flattened JSON serialization.
    pub fn parse(input: &str) -> Result<Self> {
        let raw: JweJson = serde_json::from_str(input)
            .map_err(|e| PermsError::MalformedEnvelope(format!("not a JWE JSON object: {e}")))?;

        let protected = raw.protected.unwrap_or_default();
        let protected_fields = if protected.is_empty() {
            Map::new()
        } else {
            let bytes = b64_decode(&protected)?;
            serde_json::from_slice::<Map<String, Value>>(&bytes).map_err(|e| {
                PermsError::MalformedEnvelope(format!("protected header: {e}"))
            })?
        };
        let protected_header = JoseHeader::from_map(protected_fields.clone())?;

        let mut recipients = raw.recipients.unwrap_or_default();
        // Flattened form, or a stray top-level entry next to `recipients`.
        if raw.encrypted_key.is_some() || (recipients.is_empty() && raw.header.is_some()) {
            recipients.push(RecipientEntry {
                header: raw.header,
                encrypted_key: raw.encrypted_key,
            });
        }
        if recipients.is_empty() {
            return Err(PermsError::MalformedEnvelope("no recipients".into()));
        }

        Ok(Self {
            protected,
            protected_fields,
            protected_header,
            unprotected: raw.unprotected,
            recipients,
            aad: raw.aad,
            iv: raw.iv,
            ciphertext: raw.ciphertext,
            tag: raw.tag,
        })
    }

    /// Serialize to the general JSON serialization.
    pub fn to_json(&self) -> Result<String> {
        let raw = JweJson {
            protected: (!self.protected.is_empty()).then(|| self.protected.clone()),
            unprotected: self.unprotected.clone(),
            header: None,
            encrypted_key: None,
            recipients: Some(self.recipients.clone()),
            aad: self.aad.clone(),
            iv: self.iv.clone(),
            ciphertext: self.ciphertext.clone(),
            tag: self.tag.clone(),
        };
        serde_json::to_string(&raw).map_err(|e| PermsError::SerializationError(e.to_string()))
    }

    /// The integrity-protected header.
    pub fn protected_header(&self) -> &JoseHeader {
        &self.protected_header
    }

    /// The `recipients` claim of the protected header.
    pub fn recipients_claim(&self) -> Option<&[String]> {
        self.protected_header.recipients.as_deref()
    }

    /// The `owner` claim of the protected header.
    pub fn owner_claim(&self) -> Option<&str> {
        self.protected_header.owner.as_deref()
    }

    /// The sharing claims of the protected header.
    pub fn claims(&self) -> HeaderClaims<'_> {
        HeaderClaims {
            recipients: self.recipients_claim(),
            owner: self.owner_claim(),
        }
    }

    /// Number of wrapped key entries.
    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }

    /// Decrypt with a recipient's private key.
    ///
    /// Every recipient entry is tried in turn; the first one whose content key
    /// unwraps and authenticates the content wins.
    pub fn decrypt(&self, key: &DecryptionKey) -> Result<Vec<u8>> {
        let iv = ContentIv::from_slice(&b64_decode(&self.iv)?)?;
        let ciphertext = b64_decode(&self.ciphertext)?;
        let tag = b64_decode(&self.tag)?;
        let aad = self.additional_data();

        let mut last_error = None;
        for entry in &self.recipients {
            let attempt = self
                .open_entry(entry, key)
                .and_then(|cek| cek.decrypt(&ciphertext, &tag, &iv, &aad));
            match attempt {
                Ok(plaintext) => return Ok(plaintext),
                Err(e) => last_error = Some(e),
            }
        }

        Err(PermsError::DecryptionError(match last_error {
            Some(e) => format!("no recipient entry could be opened: {e}"),
            None => "no recipient entry could be opened".into(),
        }))
    }

    /// The effective header for one recipient: protected, then shared
    /// unprotected, then per-recipient members. Earlier sources win.
    fn header_for(&self, entry: &RecipientEntry) -> Result<JoseHeader> {
        let mut merged = self.protected_fields.clone();
        for source in [self.unprotected.as_ref(), entry.header.as_ref()]
            .into_iter()
            .flatten()
        {
            for (name, value) in source {
                if PROTECTED_ONLY.contains(&name.as_str()) {
                    continue;
                }
                merged.entry(name.clone()).or_insert_with(|| value.clone());
            }
        }
        JoseHeader::from_map(merged)
    }

    fn open_entry(&self, entry: &RecipientEntry, key: &DecryptionKey) -> Result<ContentKey> {
        let header = self.header_for(entry)?;

        if let Some(crit) = header.crit {
            return Err(PermsError::UnsupportedAlgorithm(format!(
                "critical header parameters {crit:?}"
            )));
        }
        if let Some(zip) = header.zip {
            return Err(PermsError::UnsupportedAlgorithm(format!("zip={zip}")));
        }
        match header.enc.as_deref() {
            Some(A256GCM) => {}
            other => {
                return Err(PermsError::UnsupportedAlgorithm(format!("enc={other:?}")));
            }
        }
        match header.alg.as_deref() {
            Some(ECDH_ES_A256KW) => {}
            other => {
                return Err(PermsError::UnsupportedAlgorithm(format!("alg={other:?}")));
            }
        }

        let epk = header
            .epk
            .ok_or_else(|| PermsError::MalformedEnvelope("missing epk".into()))?
            .to_key()?;
        let apu = header.apu.as_deref().map(b64_decode).transpose()?;
        let apv = header.apv.as_deref().map(b64_decode).transpose()?;
        let encrypted_key = entry
            .encrypted_key
            .as_deref()
            .ok_or_else(|| PermsError::MalformedEnvelope("missing encrypted_key".into()))?;

        let share = KeyShare {
            epk,
            encrypted_key: b64_decode(encrypted_key)?,
        };
        share.open(
            key,
            apu.as_deref().unwrap_or_default(),
            apv.as_deref().unwrap_or_default(),
        )
    }

    /// AAD per RFC 7516 §5.1 step 14.
    fn additional_data(&self) -> Vec<u8> {
        match &self.aad {
            Some(aad) => format!("{}.{}", self.protected, aad).into_bytes(),
            None => self.protected.as_bytes().to_vec(),
        }
    }
}

/// Builder for an envelope with one or more recipients.
pub struct EnvelopeBuilder {
    plaintext: Vec<u8>,
    content_key: ContentKey,
    header: JoseHeader,
    recipients: Vec<EncryptionKey>,
}

impl EnvelopeBuilder {
    /// Start building an envelope around `plaintext`.
    pub fn new(plaintext: impl Into<Vec<u8>>) -> Self {
        Self {
            plaintext: plaintext.into(),
            content_key: ContentKey::generate(),
            header: JoseHeader {
                enc: Some(A256GCM.to_string()),
                ..JoseHeader::default()
            },
            recipients: Vec::new(),
        }
    }

    /// Set the protected `recipients` claim.
    pub fn recipients_claim(mut self, ids: Vec<String>) -> Self {
        self.header.recipients = Some(ids);
        self
    }

    /// Set the protected `owner` claim.
    pub fn owner_claim(mut self, owner: impl Into<String>) -> Self {
        self.header.owner = Some(owner.into());
        self
    }

    /// Wrap the content key for one more recipient.
    pub fn add_recipient(mut self, key: EncryptionKey) -> Self {
        self.recipients.push(key);
        self
    }

    /// Build the envelope.
    pub fn build(self) -> Result<Envelope> {
        if self.recipients.is_empty() {
            return Err(PermsError::EncryptionError(
                "an envelope needs at least one recipient".into(),
            ));
        }

        let mut entries = Vec::with_capacity(self.recipients.len());
        for key in &self.recipients {
            let share = KeyShare::create(&self.content_key, key)?;
            let header = JoseHeader {
                alg: Some(ECDH_ES_A256KW.to_string()),
                epk: Some(EcJwk::from_key(&share.epk)),
                ..JoseHeader::default()
            };
            entries.push(RecipientEntry {
                header: Some(header.to_map()?),
                encrypted_key: Some(b64_encode(&share.encrypted_key)),
            });
        }

        let protected_fields = self.header.to_map()?;
        let protected = b64_encode(canonical_json(&self.header)?);
        let iv = ContentIv::generate();
        let (ciphertext, tag) =
            self.content_key
                .encrypt(&self.plaintext, &iv, protected.as_bytes())?;

        Ok(Envelope {
            protected,
            protected_fields,
            protected_header: self.header,
            unprotected: None,
            recipients: entries,
            aad: None,
            iv: b64_encode(iv.as_bytes()),
            ciphertext: b64_encode(ciphertext),
            tag: b64_encode(tag),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn build_for(keys: &[&DecryptionKey]) -> Envelope {
        let mut builder = EnvelopeBuilder::new(b"attested".to_vec())
            .recipients_claim(vec!["o".into(), "r".into()])
            .owner_claim("o");
        for key in keys {
            builder = builder.add_recipient(key.encryption_key());
        }
        builder.build().unwrap()
    }

    fn reparse(envelope: &Envelope) -> Envelope {
        Envelope::parse(&envelope.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_roundtrip_multi_recipient() {
        let a = DecryptionKey::generate();
        let b = DecryptionKey::generate();
        let envelope = reparse(&build_for(&[&a, &b]));

        assert_eq!(envelope.recipient_count(), 2);
        assert_eq!(envelope.decrypt(&a).unwrap(), b"attested");
        assert_eq!(envelope.decrypt(&b).unwrap(), b"attested");
        assert_eq!(
            envelope.recipients_claim(),
            Some(&["o".to_string(), "r".to_string()][..])
        );
        assert_eq!(envelope.owner_claim(), Some("o"));
    }

    #[test]
    fn test_non_recipient_fails() {
        let a = DecryptionKey::generate();
        let envelope = build_for(&[&a]);

        assert!(matches!(
            envelope.decrypt(&DecryptionKey::generate()),
            Err(PermsError::DecryptionError(_))
        ));
    }

    #[test]
    fn test_no_recipients_rejected() {
        let result = EnvelopeBuilder::new(b"x".to_vec()).build();
        assert!(matches!(result, Err(PermsError::EncryptionError(_))));
    }

    #[test]
    fn test_wire_shape() {
        let a = DecryptionKey::generate();
        let json: Value = serde_json::from_str(&build_for(&[&a]).to_json().unwrap()).unwrap();

        let protected: Value =
            serde_json::from_slice(&b64_decode(json["protected"].as_str().unwrap()).unwrap())
                .unwrap();
        assert_eq!(
            protected,
            json!({"enc": "A256GCM", "recipients": ["o", "r"], "owner": "o"})
        );

        let entry = &json["recipients"][0];
        assert_eq!(entry["header"]["alg"], "ECDH-ES+A256KW");
        assert_eq!(entry["header"]["epk"]["crv"], "P-256");
        assert!(entry["encrypted_key"].is_string());
        assert_eq!(b64_decode(json["iv"].as_str().unwrap()).unwrap().len(), 12);
        assert_eq!(b64_decode(json["tag"].as_str().unwrap()).unwrap().len(), 16);
    }

    #[test]
    fn test_tampered_protected_header_fails() {
        let a = DecryptionKey::generate();
        let mut json: Value =
            serde_json::from_str(&build_for(&[&a]).to_json().unwrap()).unwrap();
        let forged = json!({"enc": "A256GCM", "recipients": ["o", "r", "x"], "owner": "o"});
        json["protected"] = Value::String(b64_encode(forged.to_string()));

        let envelope = Envelope::parse(&json.to_string()).unwrap();
        assert!(matches!(
            envelope.decrypt(&a),
            Err(PermsError::DecryptionError(_))
        ));
    }

    #[test]
    fn test_flattened_form() {
        let a = DecryptionKey::generate();
        let mut json: Value =
            serde_json::from_str(&build_for(&[&a]).to_json().unwrap()).unwrap();
        let entry = json["recipients"][0].clone();
        let obj = json.as_object_mut().unwrap();
        obj.remove("recipients");
        obj.insert("header".into(), entry["header"].clone());
        obj.insert("encrypted_key".into(), entry["encrypted_key"].clone());

        let envelope = Envelope::parse(&json.to_string()).unwrap();
        assert_eq!(envelope.recipient_count(), 1);
        assert_eq!(envelope.decrypt(&a).unwrap(), b"attested");
    }

    #[test]
    fn test_stray_top_level_encrypted_key() {
        let a = DecryptionKey::generate();
        let mut json: Value =
            serde_json::from_str(&build_for(&[&a]).to_json().unwrap()).unwrap();
        json["encrypted_key"] = Value::String(b64_encode([0u8; 40]));

        let envelope = Envelope::parse(&json.to_string()).unwrap();
        assert_eq!(envelope.recipient_count(), 2);
        assert_eq!(envelope.decrypt(&a).unwrap(), b"attested");
    }

    #[test]
    fn test_epk_in_protected_header() {
        let a = DecryptionKey::generate();
        let cek = ContentKey::generate();
        let share = KeyShare::create(&cek, &a.encryption_key()).unwrap();
        let header = JoseHeader {
            enc: Some(A256GCM.into()),
            owner: Some("o".into()),
            alg: Some(ECDH_ES_A256KW.into()),
            epk: Some(EcJwk::from_key(&share.epk)),
            ..JoseHeader::default()
        };
        let protected = b64_encode(serde_json::to_vec(&header).unwrap());
        let iv = ContentIv::generate();
        let (ciphertext, tag) = cek.encrypt(b"hi", &iv, protected.as_bytes()).unwrap();
        let input = json!({
            "protected": protected,
            "encrypted_key": b64_encode(&share.encrypted_key),
            "iv": b64_encode(iv.as_bytes()),
            "ciphertext": b64_encode(ciphertext),
            "tag": b64_encode(tag),
        });

        let envelope = Envelope::parse(&input.to_string()).unwrap();
        assert_eq!(envelope.decrypt(&a).unwrap(), b"hi");
        assert_eq!(envelope.owner_claim(), Some("o"));
        assert_eq!(envelope.recipients_claim(), None);
    }

    #[test]
    fn test_claims_ignored_outside_protected_header() {
        let a = DecryptionKey::generate();
        let mut json: Value =
            serde_json::from_str(&build_for(&[&a]).to_json().unwrap()).unwrap();
        json["unprotected"] = json!({"owner": "mallory", "recipients": ["mallory"]});
        json["recipients"][0]["header"]["owner"] = json!("mallory");

        let envelope = Envelope::parse(&json.to_string()).unwrap();
        assert_eq!(envelope.owner_claim(), Some("o"));
        assert_eq!(envelope.decrypt(&a).unwrap(), b"attested");
    }

    #[test]
    fn test_unsupported_enc_fails() {
        let a = DecryptionKey::generate();
        let mut json: Value =
            serde_json::from_str(&build_for(&[&a]).to_json().unwrap()).unwrap();
        json["protected"] = Value::String(b64_encode(r#"{"enc":"A128GCM"}"#));

        let envelope = Envelope::parse(&json.to_string()).unwrap();
        assert!(envelope.decrypt(&a).is_err());
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(Envelope::parse("not json").is_err());
        assert!(Envelope::parse(r#"{"iv":"","ciphertext":"","tag":""}"#).is_err());
        assert!(Envelope::parse(
            r#"{"protected":"!!","recipients":[{}],"iv":"","ciphertext":"","tag":""}"#
        )
        .is_err());
    }
}
