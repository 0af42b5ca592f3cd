//! Webhook signature verification.
//!
//! The provider signs the exact raw body bytes with HMAC-SHA512 and sends
//! the hex digest in a header, optionally prefixed with the algorithm
//! (`sha512=<hex>`). Verification must run over those same raw bytes;
//! reparsing and reserializing the JSON can reorder keys or change
//! whitespace and break the MAC for a genuine sender.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the provider's hex-encoded HMAC digest.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Returns true only when the header digest matches the HMAC-SHA512 of the
/// raw body under the shared secret. The comparison runs in constant time
/// (`Mac::verify_slice`). An empty secret or absent/empty/non-hex header is
/// a verification failure, never a panic.
pub fn verify(raw_body: &[u8], signature_header: Option<&str>, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(header) = signature_header else {
        return false;
    };
    let provided = match header.split_once('=') {
        Some((_algo, digest)) => digest.trim(),
        None => header.trim(),
    };
    if provided.is_empty() {
        return false;
    }
    let Ok(provided_bytes) = hex::decode(provided) else {
        return false;
    };

    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(raw_body);
    mac.verify_slice(&provided_bytes).is_ok()
}

/// Hex digest a sender would attach for `body` under `secret`. Used by the
/// test suites to produce genuine signatures.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    #[test]
    fn accepts_genuine_signature() {
        let body = br#"{"event":"charge.success","data":{"reference":"R1"}}"#;
        let sig = sign(body, SECRET);
        assert!(verify(body, Some(&sig), SECRET));
    }

    #[test]
    fn accepts_algorithm_prefixed_header() {
        let body = b"payload";
        let sig = format!("sha512={}", sign(body, SECRET));
        assert!(verify(body, Some(&sig), SECRET));
    }

    #[test]
    fn rejects_single_altered_byte() {
        let body = br#"{"amount":500000}"#.to_vec();
        let sig = sign(&body, SECRET);
        let mut tampered = body.clone();
        tampered[10] ^= 0x01;
        assert!(!verify(&tampered, Some(&sig), SECRET));
    }

    #[test]
    fn rejects_wrong_secret() {
        let body = b"payload";
        let sig = sign(body, SECRET);
        assert!(!verify(body, Some(&sig), "other_secret"));
    }

    #[test]
    fn rejects_missing_or_empty_header() {
        assert!(!verify(b"payload", None, SECRET));
        assert!(!verify(b"payload", Some(""), SECRET));
        assert!(!verify(b"payload", Some("sha512="), SECRET));
    }

    #[test]
    fn rejects_non_hex_header() {
        assert!(!verify(b"payload", Some("not-hex!"), SECRET));
    }

    #[test]
    fn rejects_when_secret_unconfigured() {
        let body = b"payload";
        let sig = sign(body, SECRET);
        assert!(!verify(body, Some(&sig), ""));
    }

    #[test]
    fn signature_covers_raw_bytes_not_json_structure() {
        // Same JSON value, different byte layout: only the signed layout
        // verifies.
        let compact = br#"{"a":1,"b":2}"#;
        let spaced = br#"{ "a": 1, "b": 2 }"#;
        let sig = sign(compact, SECRET);
        assert!(verify(compact, Some(&sig), SECRET));
        assert!(!verify(spaced, Some(&sig), SECRET));
    }
}
