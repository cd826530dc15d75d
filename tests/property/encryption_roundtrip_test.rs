//! Property-based tests for the simulated encryption payload.
//!
//! Any string must survive encode/decode unchanged. Changing a checksum digit,
//! or swapping in the body of a different plaintext, must be caught.

use keydeck::services::checksum::checksum;
use keydeck::services::encryption_service::{decode_payload, encode_payload, payload_prefix};
use keydeck::types::errors::DecryptError;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn payload_roundtrip_preserves_plaintext(plaintext in any::<String>()) {
        let payload = encode_payload(&plaintext);
        prop_assert!(payload.starts_with(&payload_prefix()));
        prop_assert_eq!(decode_payload(&payload), Ok(plaintext));
    }

    #[test]
    fn foreign_body_fails_checksum(a in "[ -~]{0,48}", b in "[ -~]{0,48}") {
        prop_assume!(checksum(&a) != checksum(&b));
        let body_b = encode_payload(&b);
        let body_b = body_b.split(':').nth(1).unwrap();
        let forged = format!("{}{}:{}", payload_prefix(), body_b, checksum(&a));
        prop_assert_eq!(decode_payload(&forged), Err(DecryptError::ChecksumMismatch));
    }

    #[test]
    fn flipped_checksum_digit_is_detected(
        plaintext in "[ -~]{0,64}",
        position in 0usize..8,
        replacement in proptest::sample::select(b"0123456789abcdef".to_vec()),
    ) {
        let payload = encode_payload(&plaintext);
        let sum_start = payload.len() - 8;
        let original = payload.as_bytes()[sum_start + position];
        prop_assume!(original != replacement);

        let mut bytes = payload.into_bytes();
        bytes[sum_start + position] = replacement;
        let tampered = String::from_utf8(bytes).unwrap();
        prop_assert_eq!(decode_payload(&tampered), Err(DecryptError::ChecksumMismatch));
    }

    #[test]
    fn strings_without_prefix_are_invalid_format(s in "[a-y][ -~]{0,40}") {
        prop_assert_eq!(decode_payload(&s), Err(DecryptError::InvalidFormat));
    }
}
