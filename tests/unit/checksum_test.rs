//! Unit tests for key format generation, validation, masking and checksums.

use keydeck::services::checksum::{
    checksum, generate_secret, looks_unmasked, mask_secret, secret_prefix, validate_format,
    SECRET_ALPHABET,
};
use rstest::rstest;

#[test]
fn test_secret_prefix() {
    assert_eq!(secret_prefix(), "zmk_v1_");
}

#[test]
fn test_generated_body_uses_alphabet() {
    let secret = generate_secret(64).unwrap();
    let body = &secret[secret_prefix().len()..];
    assert_eq!(body.len(), 64);
    assert!(body.bytes().all(|b| SECRET_ALPHABET.contains(&b)));
}

#[rstest]
#[case("zmk_v1_abcDEF012-_", true)]
#[case("zmk_v1_x", true)]
#[case("zmk_v1_", false)]
#[case("zmk_v2_abcdef", false)]
#[case("ZMK_v1_abcdef", false)]
#[case("zmk_v1_abc$def", false)]
#[case("", false)]
fn test_validate_format_cases(#[case] candidate: &str, #[case] expected: bool) {
    assert_eq!(validate_format(candidate), expected);
}

#[test]
fn test_mask_keeps_length_and_prefix() {
    let secret = "zmk_v1_0123456789abcdef";
    let masked = mask_secret(secret);
    assert!(masked.starts_with("zmk_v1_0"));
    assert_eq!(masked.chars().count(), secret.chars().count());
    assert_eq!(masked.chars().filter(|c| *c == '•').count(), secret.len() - 8);
}

#[test]
fn test_masked_value_does_not_look_unmasked() {
    let masked = mask_secret(&generate_secret(32).unwrap());
    assert!(!looks_unmasked(&masked));
}

#[test]
fn test_checksum_is_deterministic_and_fixed_width() {
    let a = checksum("zmk_v1_same");
    assert_eq!(a, checksum("zmk_v1_same"));
    assert_eq!(a.len(), 8);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, checksum("zmk_v1_other"));
}

#[test]
fn test_checksum_counts_utf16_units() {
    // U+1F511 is a surrogate pair: 0xD83D then 0xDD11.
    let expected = (0xD83Du32 * 31 + 0xDD11) as i32;
    assert_eq!(checksum("🔑"), format!("{:08x}", expected.unsigned_abs()));
}
