//! Property-based tests for key generation, masking and legacy migration.

use std::collections::BTreeSet;

use chrono::Utc;
use keydeck::services::checksum::{generate_secret, looks_unmasked, mask_secret, validate_format};
use keydeck::services::credential_store::migrate_legacy;
use keydeck::services::encryption_service::decode_payload;
use keydeck::types::credential::{Credential, MASK_GLYPH, VISIBLE_PREFIX_LEN};
use proptest::prelude::*;

fn legacy_record(id: usize, raw: &str) -> Credential {
    Credential {
        id: format!("legacy-{}", id),
        title: "legacy".to_string(),
        description: None,
        display_value: raw.to_string(),
        encrypted_payload: None,
        created_at: Utc::now(),
        revoked: false,
        revoked_at: None,
        read_scopes: BTreeSet::new(),
        write_scopes: BTreeSet::new(),
        last_regenerated_at: None,
        encryption_metadata: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generated_secrets_validate(len in 1usize..=96) {
        let secret = generate_secret(len).unwrap();
        prop_assert!(validate_format(&secret));
        prop_assert_eq!(secret.len(), "zmk_v1_".len() + len);
    }

    #[test]
    fn mask_hides_everything_past_prefix(secret in "[A-Za-z0-9_-]{9,80}") {
        let masked = mask_secret(&secret);
        prop_assert_eq!(masked.chars().count(), secret.chars().count());
        let visible: String = secret.chars().take(VISIBLE_PREFIX_LEN).collect();
        prop_assert!(masked.starts_with(&visible));
        prop_assert!(masked.chars().skip(VISIBLE_PREFIX_LEN).all(|c| c == MASK_GLYPH));
        prop_assert!(!looks_unmasked(&masked));
    }

    #[test]
    fn short_secrets_fully_masked(secret in "[A-Za-z0-9]{1,8}") {
        let masked = mask_secret(&secret);
        prop_assert!(masked.chars().all(|c| c == MASK_GLYPH));
        prop_assert_ne!(masked, secret);
    }

    #[test]
    fn migration_is_idempotent_and_recoverable(
        secrets in proptest::collection::vec("zmk_v1_[A-Za-z0-9_-]{8,40}", 1..6),
    ) {
        let mut records: Vec<Credential> = secrets
            .iter()
            .enumerate()
            .map(|(i, s)| legacy_record(i, s))
            .collect();

        prop_assert_eq!(migrate_legacy(&mut records), secrets.len());
        prop_assert_eq!(migrate_legacy(&mut records), 0);

        for (record, secret) in records.iter().zip(&secrets) {
            prop_assert_eq!(&record.display_value, &mask_secret(secret));
            let payload = record.encrypted_payload.as_deref().unwrap();
            prop_assert_eq!(decode_payload(payload), Ok(secret.clone()));
        }
    }
}
