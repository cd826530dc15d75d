//! Property-based tests for ConsoleSettings serialization round-trip.
//!
//! Settings must survive a JSON write and read without data loss, so a
//! saved `settings.json` always reloads to the same configuration.

use keydeck::types::settings::{
    ConsoleSettings, KeySettings, LatencySettings, LoggingSettings, StorageSettings,
};
use proptest::prelude::*;

fn arb_storage() -> impl Strategy<Value = StorageSettings> {
    ("[a-z]{1,12}\\.db", "[a-z][a-z0-9-]{0,15}").prop_map(|(database_file, namespace)| {
        StorageSettings {
            database_file,
            namespace,
        }
    })
}

fn arb_latency() -> impl Strategy<Value = LatencySettings> {
    proptest::array::uniform11(0u64..5_000).prop_map(|ms| LatencySettings {
        list_ms: ms[0],
        create_ms: ms[1],
        update_ms: ms[2],
        revoke_ms: ms[3],
        delete_ms: ms[4],
        regenerate_ms: ms[5],
        decrypt_ms: ms[6],
        encrypt_payload_ms: ms[7],
        decrypt_payload_ms: ms[8],
        stats_ms: ms[9],
        jitter_ms: ms[10],
    })
}

fn arb_keys() -> impl Strategy<Value = KeySettings> {
    (
        8usize..=128,
        proptest::collection::vec("[a-z]{1,10}", 0..5),
        any::<bool>(),
    )
        .prop_map(|(secret_length, default_read_scopes, write_implies_read)| KeySettings {
            secret_length,
            default_read_scopes,
            write_implies_read,
        })
}

fn arb_settings() -> impl Strategy<Value = ConsoleSettings> {
    (arb_storage(), arb_latency(), arb_keys(), "[a-z_]{1,10}=(info|debug|warn)").prop_map(
        |(storage, latency, keys, filter)| ConsoleSettings {
            storage,
            latency,
            keys,
            logging: LoggingSettings { filter },
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn settings_json_roundtrip(settings in arb_settings()) {
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let back: ConsoleSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    #[test]
    fn missing_sections_take_defaults(keys in arb_keys()) {
        let json = serde_json::json!({ "keys": keys.clone() });
        let back: ConsoleSettings = serde_json::from_value(json).unwrap();
        prop_assert_eq!(back.keys, keys);
        prop_assert_eq!(back.latency, LatencySettings::default());
        prop_assert_eq!(back.storage, StorageSettings::default());
    }
}
