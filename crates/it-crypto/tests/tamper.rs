//! Envelopes altered after encryption, or assembled with inconsistent layers.

use serde_json::Value;

use it_crypto::core::{b64_decode, b64_encode, canonical_json, Signed};
use it_crypto::perms::EnvelopeBuilder;
use it_crypto::{
    AuthenticatedUser, ItCryptoError, PolicyViolation, RemoteUser, SharedLog, SignedLog,
};
use it_crypto_testkit::fixtures::TestFixture;

/// Sign a SharedLog as `creator` and encrypt it for `receivers`, with
/// header claims chosen independently of the signed content.
fn forge_envelope(
    creator: &AuthenticatedUser,
    log: &SignedLog,
    signed_recipients: &[&str],
    header_recipients: &[&str],
    header_owner: &str,
    receivers: &[RemoteUser],
) -> String {
    let shared = SharedLog {
        log: log.clone(),
        recipients: signed_recipients.iter().map(|r| r.to_string()).collect(),
        creator: creator.id().to_string(),
    };
    let jws = creator.sign_data(&canonical_json(&shared).unwrap()).unwrap();
    let signed: Signed<SharedLog> = Signed::from_jws(jws);

    receivers
        .iter()
        .fold(
            EnvelopeBuilder::new(signed.to_json().unwrap())
                .recipients_claim(header_recipients.iter().map(|r| r.to_string()).collect())
                .owner_claim(header_owner),
            |builder, r| builder.add_recipient(r.encryption_certificate().clone()),
        )
        .build()
        .unwrap()
        .to_json()
        .unwrap()
}

fn edit_json(jwe: &str, edit: impl FnOnce(&mut Value)) -> String {
    let mut value: Value = serde_json::from_str(jwe).unwrap();
    edit(&mut value);
    value.to_string()
}

#[test]
fn test_forged_envelope_with_matching_claims_is_accepted() {
    let f = TestFixture::new();
    let jwe = forge_envelope(
        &f.owner,
        &f.signed_log(),
        &["o", "r"],
        &["o", "r"],
        "o",
        &[f.owner.remote(), f.receiver.remote()],
    );
    assert!(f.receiver.decrypt_log(&jwe, &f.directory()).is_ok());
}

#[test]
fn test_header_recipients_substituted() {
    let f = TestFixture::new();
    let jwe = forge_envelope(
        &f.owner,
        &f.signed_log(),
        &["o", "r"],
        &["o", "r", "u"],
        "o",
        &[f.owner.remote(), f.receiver.remote()],
    );

    let err = f.receiver.decrypt_log(&jwe, &f.directory()).unwrap_err();
    assert!(matches!(
        err,
        ItCryptoError::MalformedData(PolicyViolation::RecipientsMismatch)
    ));
}

#[test]
fn test_header_recipients_reordered() {
    let f = TestFixture::new();
    let jwe = forge_envelope(
        &f.owner,
        &f.signed_log(),
        &["o", "r"],
        &["r", "o"],
        "o",
        &[f.owner.remote(), f.receiver.remote()],
    );

    let err = f.owner.decrypt_log(&jwe, &f.directory()).unwrap_err();
    assert!(matches!(
        err,
        ItCryptoError::MalformedData(PolicyViolation::RecipientsMismatch)
    ));
}

#[test]
fn test_key_share_for_unlisted_party() {
    let f = TestFixture::new();
    // The outsider can open the envelope but is not a signed recipient.
    let jwe = forge_envelope(
        &f.owner,
        &f.signed_log(),
        &["r"],
        &["r"],
        "o",
        &[f.receiver.remote(), f.outsider.remote()],
    );

    let err = f.outsider.decrypt_log(&jwe, &f.directory()).unwrap_err();
    assert_eq!(
        err.description(),
        "The receiver u is not among the recipients of the SharedLog."
    );
}

#[test]
fn test_header_owner_substituted() {
    let f = TestFixture::new();
    let jwe = forge_envelope(
        &f.owner,
        &f.signed_log(),
        &["r"],
        &["r"],
        "r",
        &[f.receiver.remote()],
    );

    let err = f.receiver.decrypt_log(&jwe, &f.directory()).unwrap_err();
    assert!(matches!(
        err,
        ItCryptoError::MalformedData(PolicyViolation::OwnerMismatch)
    ));
}

#[test]
fn test_protected_header_tampered() {
    let f = TestFixture::new();
    let jwe = f
        .owner
        .encrypt_log(&f.signed_log(), &[f.receiver.remote()])
        .unwrap();

    let tampered = edit_json(&jwe, |v| {
        let protected = v["protected"].as_str().unwrap();
        let mut header: Value = serde_json::from_slice(&b64_decode(protected).unwrap()).unwrap();
        header["recipients"] = serde_json::json!(["r", "u"]);
        v["protected"] = Value::String(b64_encode(header.to_string()));
    });

    let err = f.receiver.decrypt_log(&tampered, &f.directory()).unwrap_err();
    assert!(matches!(err, ItCryptoError::Decryption { .. }));
}

#[test]
fn test_unprotected_claims_are_ignored() {
    let f = TestFixture::new();
    let jwe = f
        .owner
        .encrypt_log(&f.signed_log(), &[f.receiver.remote()])
        .unwrap();

    let with_unprotected = edit_json(&jwe, |v| {
        v["unprotected"] = serde_json::json!({"recipients": ["u"], "owner": "u"});
    });
    assert!(f
        .receiver
        .decrypt_log(&with_unprotected, &f.directory())
        .is_ok());
}

#[test]
fn test_ciphertext_tampered() {
    let f = TestFixture::new();
    let jwe = f
        .monitor
        .encrypt_log(&f.signed_log(), &[f.owner.remote()])
        .unwrap();

    let tampered = edit_json(&jwe, |v| {
        let mut ciphertext = b64_decode(v["ciphertext"].as_str().unwrap()).unwrap();
        ciphertext[0] ^= 0x01;
        v["ciphertext"] = Value::String(b64_encode(ciphertext));
    });

    let err = f.owner.decrypt_log(&tampered, &f.directory()).unwrap_err();
    assert!(matches!(err, ItCryptoError::Decryption { .. }));
}

#[test]
fn test_encrypted_key_swapped() {
    let f = TestFixture::new();
    let jwe = f
        .owner
        .encrypt_log(&f.signed_log(), &[f.owner.remote(), f.receiver.remote()])
        .unwrap();

    // Both entries now carry the owner's share.
    let tampered = edit_json(&jwe, |v| {
        let first = v["recipients"][0].clone();
        v["recipients"][1] = first;
    });

    assert!(f.owner.decrypt_log(&tampered, &f.directory()).is_ok());
    let err = f.receiver.decrypt_log(&tampered, &f.directory()).unwrap_err();
    assert!(matches!(err, ItCryptoError::Decryption { .. }));
}
