//! Hex string codec for envelope fields
//!
//! EIP-2335 stores binary fields as unprefixed hex strings. Decoding accepts
//! either case; encoding always produces lower case.

use crate::error::{KeystoreError, KeystoreResult};

/// Encode bytes as a lower-case hex string without `0x` prefix.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    ::hex::encode(bytes)
}

/// Decode an unprefixed hex string, accepting either case.
pub fn decode(s: &str) -> KeystoreResult<Vec<u8>> {
    ::hex::decode(s).map_err(|e| KeystoreError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_lower_case() {
        assert_eq!(encode([0xDE, 0xAD, 0xBE, 0xEF]), "deadbeef");
        assert_eq!(encode([]), "");
    }

    #[test]
    fn test_decode_round_trip() {
        let bytes = vec![0x00, 0x7f, 0x80, 0xff];
        assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
    }

    #[test]
    fn test_decode_accepts_upper_case() {
        assert_eq!(decode("DEADBEEF").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        // Re-encoding canonicalizes to lower case
        assert_eq!(encode(decode("DeadBeef").unwrap()), "deadbeef");
    }

    #[test]
    fn test_decode_rejects_odd_length() {
        assert!(matches!(decode("abc"), Err(KeystoreError::InvalidHex(_))));
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        assert!(matches!(decode("zz"), Err(KeystoreError::InvalidHex(_))));
        assert!(matches!(decode("0x00"), Err(KeystoreError::InvalidHex(_))));
    }
}
