//! Canonical encodings shared by every layer of the protocol.
//!
//! - JSON: records are serialized with `serde_json` in struct field order,
//!   without whitespace. This is the byte string that gets signed, so the
//!   field order of [`AccessLog`](crate::AccessLog) and
//!   [`SharedLog`](crate::SharedLog) is part of the wire format.
//! - base64url: RFC 4648 §5 alphabet, no padding (RFC 7515 §2).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// Serialize a value to its canonical JSON bytes.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CoreError::EncodingError(e.to_string()))
}

/// Parse JSON bytes into a value.
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
}

/// Encode bytes as unpadded base64url.
pub fn b64_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url.
pub fn b64_decode(s: &str) -> Result<Vec<u8>> {
    Ok(URL_SAFE_NO_PAD.decode(s)?)
}

/// Decode a base64url string and parse the result as JSON.
pub fn b64_json<T: DeserializeOwned>(s: &str) -> Result<T> {
    from_json(&b64_decode(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        zeta: u8,
        alpha: String,
    }

    #[test]
    fn test_json_keeps_field_order() {
        let bytes = canonical_json(&Sample {
            zeta: 1,
            alpha: "a".into(),
        })
        .unwrap();
        assert_eq!(bytes, br#"{"zeta":1,"alpha":"a"}"#);
    }

    #[test]
    fn test_b64_is_unpadded_url_safe() {
        assert_eq!(b64_encode([0xfb, 0xff]), "-_8");
        assert_eq!(b64_decode("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_b64_rejects_padding() {
        assert!(b64_decode("-_8=").is_err());
    }

    #[test]
    fn test_b64_json() {
        let encoded = b64_encode(br#"{"zeta":7,"alpha":"x"}"#);
        let sample: Sample = b64_json(&encoded).unwrap();
        assert_eq!(
            sample,
            Sample {
                zeta: 7,
                alpha: "x".into()
            }
        );
    }
}
