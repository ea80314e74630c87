//! Proptest generators for property-based testing.
//!
//! Key generation is comparatively slow, so strategies produce ids and
//! log contents only. Identities are generated from ids inside the test.

use proptest::prelude::*;

use it_crypto::AccessLog;

/// A user id.
pub fn user_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9._-]{0,15}".prop_map(String::from)
}

/// A non-negative timestamp.
pub fn timestamp() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX / 2
}

/// Free text, including characters JSON has to escape.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ -~]{0,32}".prop_map(String::from),
        any::<String>().prop_map(|s| s.chars().take(32).collect()),
    ]
}

/// A kind of access.
pub fn access_kind() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Direct".to_string()),
        Just("Aggregate".to_string()),
        text(),
    ]
}

/// A list of data categories, possibly empty.
pub fn data_types() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(text(), 0..4)
}

/// An access log between two distinct parties.
pub fn access_log_between(monitor: String, owner: String) -> impl Strategy<Value = AccessLog> {
    (text(), text(), timestamp(), access_kind(), data_types()).prop_map(
        move |(tool, justification, timestamp, access_kind, data_type)| AccessLog {
            monitor: monitor.clone(),
            owner: owner.clone(),
            tool,
            justification,
            timestamp,
            access_kind,
            data_type,
        },
    )
}

/// Distinct ids for further recipients, none equal to `"m"` or `"o"`.
pub fn extra_recipients(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(user_id(), 0..=max).prop_map(|ids| {
        ids.into_iter()
            .filter(|id| id != "m" && id != "o")
            .collect()
    })
}

/// Parameters of a sharing scenario: an arbitrary log from monitor "m" to
/// owner "o", and the ids the owner re-shares with besides itself.
#[derive(Debug, Clone)]
pub struct SharingParams {
    pub log: AccessLog,
    pub extra_recipients: Vec<String>,
}

impl Arbitrary for SharingParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            access_log_between("m".to_string(), "o".to_string()),
            extra_recipients(3),
        )
            .prop_map(|(log, extra_recipients)| SharingParams {
                log,
                extra_recipients,
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn access_log_json_roundtrips(log in access_log_between("m".into(), "o".into())) {
            let json = log.to_json().unwrap();
            prop_assert_eq!(AccessLog::from_json(&json).unwrap(), log);
        }

        #[test]
        fn extra_recipients_exclude_parties(ids in extra_recipients(5)) {
            prop_assert!(ids.iter().all(|id| id != "m" && id != "o"));
        }
    }
}
