//! Base58 and Base58Check codec over the `bs58` crate.
//!
//! Base58Check appends the first four bytes of `double_sha256(payload)`
//! before encoding. Decoding errors are mapped onto [`BsvError`] so callers
//! see the offending symbol and both checksums.

use crate::error::BsvError;
use crate::hash::checksum;

/// Encode bytes as Base58. Empty input yields an empty string.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decode a Base58 string.
///
/// Fails with [`BsvError::InvalidCharacter`] on the first symbol outside the
/// alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, BsvError> {
    bs58::decode(s).into_vec().map_err(|e| decode_error(s, e))
}

/// Encode `payload` followed by its 4-byte double-SHA-256 checksum.
pub fn encode_check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode a Base58Check string and verify its checksum, returning the payload.
///
/// A mismatch reports both the checksum computed from the payload
/// (`expected`) and the one carried by the string (`actual`).
pub fn decode_check(s: &str) -> Result<Vec<u8>, BsvError> {
    let mut decoded = decode(s)?;
    if decoded.len() < 4 {
        return Err(BsvError::PayloadTooShort {
            length: decoded.len(),
        });
    }

    let split = decoded.len() - 4;
    let mut actual = [0u8; 4];
    actual.copy_from_slice(&decoded[split..]);
    decoded.truncate(split);

    let expected = checksum(&decoded);
    if expected != actual {
        return Err(BsvError::ChecksumMismatch { expected, actual });
    }
    Ok(decoded)
}

/// `bs58` reports byte offsets; everything before the failing symbol is
/// ASCII, so the byte offset is also the character position.
fn decode_error(s: &str, err: bs58::decode::Error) -> BsvError {
    match err {
        bs58::decode::Error::InvalidCharacter { character, index } => BsvError::InvalidCharacter {
            character,
            position: index,
        },
        bs58::decode::Error::NonAsciiCharacter { index } => BsvError::InvalidCharacter {
            character: s.get(index..).and_then(|t| t.chars().next()).unwrap_or('?'),
            position: index,
        },
        other => BsvError::InvalidBase58(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_encodes_to_empty_string() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn single_zero_byte() {
        assert_eq!(encode(&[0]), "1");
        assert_eq!(decode("1").unwrap(), vec![0]);
    }

    #[test]
    fn leading_zeros_are_preserved() {
        let input = hex::decode("000000287fb4cd").unwrap();
        assert_eq!(encode(&input), "111233QC4");
        assert_eq!(decode("111233QC4").unwrap(), input);
        assert_eq!(encode(&[0, 0, 0, 0]), "1111");
    }

    #[test]
    fn known_vectors() {
        let cases = [
            (
                "00010966776006953d5567439e5e39f86a0d273beed61967f6",
                "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM",
            ),
            ("0123456789abcdef", "C3CPq7c8PY"),
            ("ffffffff", "7YXq9G"),
            ("61", "2g"),
            ("626262", "a3gV"),
        ];
        for (hex_in, expected) in cases {
            let bytes = hex::decode(hex_in).unwrap();
            assert_eq!(encode(&bytes), expected, "encode {hex_in}");
            assert_eq!(decode(expected).unwrap(), bytes, "decode {expected}");
        }
    }

    #[test]
    fn invalid_character_is_named() {
        for (input, bad, position) in [("12O4", 'O', 2), ("0abc", '0', 0), ("abcl", 'l', 3)] {
            assert_eq!(
                decode(input),
                Err(BsvError::InvalidCharacter {
                    character: bad,
                    position
                })
            );
        }
    }

    #[test]
    fn non_ascii_character_rejected() {
        assert!(matches!(
            decode("1é"),
            Err(BsvError::InvalidCharacter { character: 'é', .. })
        ));
    }

    #[test]
    fn check_roundtrip_twenty_zero_bytes() {
        let payload = [0u8; 20];
        let encoded = encode_check(&payload);
        assert!(encoded.starts_with(&"1".repeat(20)));
        assert_eq!(decode_check(&encoded).unwrap(), payload.to_vec());
    }

    #[test]
    fn check_encodes_genesis_address_hash() {
        let payload = hex::decode("0062e907b15cbf27d5425399ebf6f0fb50ebb88f18").unwrap();
        assert_eq!(encode_check(&payload), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    }

    #[test]
    fn check_mismatch_reports_expected_and_actual() {
        let payload = vec![0x80, 0x01, 0x02, 0x03];
        let mut raw = payload.clone();
        raw.extend_from_slice(&[0, 0, 0, 0]);
        let encoded = encode(&raw);

        match decode_check(&encoded) {
            Err(BsvError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, checksum(&payload));
                assert_eq!(actual, [0, 0, 0, 0]);
            }
            other => panic!("expected ChecksumMismatch, got {other:?}"),
        }
    }

    #[test]
    fn flipped_checksum_byte_fails() {
        let payload = hex::decode("00f54a5851e9372b87810a8e60cdd2e7cfd80b6e31").unwrap();
        let mut raw = payload.clone();
        raw.extend_from_slice(&checksum(&payload));
        let last = raw.len() - 1;
        raw[last] ^= 0x01;

        assert!(matches!(
            decode_check(&encode(&raw)),
            Err(BsvError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn check_too_short_payload() {
        assert_eq!(
            decode_check("1"),
            Err(BsvError::PayloadTooShort { length: 1 })
        );
    }
}
