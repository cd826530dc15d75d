//! Unit tests for the credential store against an in-memory key-value area.

use std::collections::BTreeSet;
use std::sync::Arc;

use keydeck::database::{KeyValueStore, MemoryKvStore};
use keydeck::services::checksum::{generate_secret, mask_secret, validate_format};
use keydeck::services::credential_store::{CredentialStore, StoreLatency, StoreOptions, KEYS_ENTRY};
use keydeck::services::encryption_service::{encode_payload, EncryptionService};
use keydeck::types::credential::{Credential, CredentialPatch, NewCredential, RevealedSecret, MASK_GLYPH};
use keydeck::types::errors::{DecryptError, KeyError, RevealError};

const NS: &str = "keydeck";

fn setup() -> (Arc<MemoryKvStore>, CredentialStore) {
    let kv = Arc::new(MemoryKvStore::new());
    let options = StoreOptions {
        latency: StoreLatency::default(),
        ..StoreOptions::default()
    };
    let store = CredentialStore::new(kv.clone(), EncryptionService::instant(), options);
    (kv, store)
}

fn stored(kv: &MemoryKvStore) -> Vec<Credential> {
    let raw = kv.get(NS, KEYS_ENTRY).unwrap().unwrap_or_else(|| "[]".to_string());
    serde_json::from_str(&raw).unwrap()
}

fn scopes(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_create_returns_secret_once_and_stores_masked() {
    let (kv, store) = setup();
    let issued = store.create(NewCredential::titled("CI token")).await.unwrap();

    assert!(validate_format(issued.secret.expose()));
    assert!(issued.credential.display_value.contains(MASK_GLYPH));
    assert_ne!(issued.credential.display_value, issued.secret.expose());

    let raw = kv.get(NS, KEYS_ENTRY).unwrap().unwrap();
    assert!(!raw.contains(issued.secret.expose()));
    assert_eq!(stored(&kv), vec![issued.credential.clone()]);
}

#[tokio::test]
async fn test_create_applies_default_read_scopes() {
    let (_, store) = setup();
    let issued = store.create(NewCredential::titled("Reader")).await.unwrap();
    assert_eq!(issued.credential.read_scopes, scopes(&["keys"]));
    assert!(issued.credential.write_scopes.is_empty());
}

#[tokio::test]
async fn test_create_with_supplied_secret() {
    let (_, store) = setup();
    let mut input = NewCredential::titled("Imported");
    input.secret = Some(RevealedSecret::new("zmk_v1_importedSecretValue"));
    let issued = store.create(input).await.unwrap();
    assert_eq!(issued.secret.expose(), "zmk_v1_importedSecretValue");
    assert_eq!(issued.credential.display_value, mask_secret("zmk_v1_importedSecretValue"));

    let revealed = store.reveal(&issued.credential.id).await.unwrap();
    assert_eq!(revealed.expose(), "zmk_v1_importedSecretValue");
}

#[tokio::test]
async fn test_blank_description_dropped() {
    let (_, store) = setup();
    let issued = store
        .create(NewCredential::titled("Quiet").with_description("   "))
        .await
        .unwrap();
    assert_eq!(issued.credential.description, None);
}

#[tokio::test]
async fn test_update_patches_fields_and_keeps_secret() {
    let (kv, store) = setup();
    let issued = store.create(NewCredential::titled("Old")).await.unwrap();
    let id = issued.credential.id.clone();

    let patch = CredentialPatch {
        title: Some("  New  ".to_string()),
        description: Some(Some("billing export".to_string())),
        write_scopes: Some(scopes(&["billing"])),
        ..CredentialPatch::default()
    };
    let updated = store.update(&id, patch).await.unwrap().unwrap();
    assert_eq!(updated.title, "New");
    assert_eq!(updated.description.as_deref(), Some("billing export"));
    assert!(updated.read_scopes.contains("billing"));
    assert_eq!(updated.encrypted_payload, issued.credential.encrypted_payload);
    assert_eq!(stored(&kv)[0], updated);
}

#[tokio::test]
async fn test_update_can_clear_description() {
    let (_, store) = setup();
    let issued = store
        .create(NewCredential::titled("Noted").with_description("note"))
        .await
        .unwrap();
    let patch = CredentialPatch {
        description: Some(None),
        ..CredentialPatch::default()
    };
    let updated = store.update(&issued.credential.id, patch).await.unwrap().unwrap();
    assert_eq!(updated.description, None);
}

#[tokio::test]
async fn test_update_rejects_blank_title() {
    let (_, store) = setup();
    let issued = store.create(NewCredential::titled("Keep")).await.unwrap();
    let err = store
        .update(&issued.credential.id, CredentialPatch::title(" "))
        .await
        .unwrap_err();
    assert!(matches!(err, KeyError::InvalidInput(_)));
}

#[tokio::test]
async fn test_revoked_key_still_decrypts() {
    let (_, store) = setup();
    let issued = store.create(NewCredential::titled("Retired")).await.unwrap();
    let revoked = store.revoke(&issued.credential.id).await.unwrap().unwrap();
    assert!(revoked.revoked);

    let secret = store.decrypt(&issued.credential.id).await.unwrap();
    assert_eq!(secret, issued.secret);
}

#[tokio::test]
async fn test_regenerate_on_revoked_keeps_revocation() {
    let (_, store) = setup();
    let issued = store.create(NewCredential::titled("Rotate")).await.unwrap();
    let id = issued.credential.id.clone();
    store.revoke(&id).await.unwrap();

    let rotated = store.regenerate(&id).await.unwrap().unwrap();
    assert!(rotated.credential.revoked);
    assert!(rotated.credential.last_regenerated_at.is_some());
    assert_ne!(rotated.secret, issued.secret);
    assert_eq!(store.decrypt(&id).await.unwrap(), rotated.secret);
}

#[tokio::test]
async fn test_update_revoked_key_keeps_revocation() {
    let (kv, store) = setup();
    let issued = store.create(NewCredential::titled("Frozen")).await.unwrap();
    let id = issued.credential.id.clone();
    let revoked = store.revoke(&id).await.unwrap().unwrap();

    let updated = store.update(&id, CredentialPatch::title("Renamed")).await.unwrap().unwrap();
    assert_eq!(updated.title, "Renamed");
    assert!(updated.revoked);
    assert_eq!(updated.revoked_at, revoked.revoked_at);

    let persisted = stored(&kv);
    assert!(persisted[0].revoked);
    assert_eq!(persisted[0].revoked_at, revoked.revoked_at);
}

#[tokio::test]
async fn test_delete_removes_only_target() {
    let (kv, store) = setup();
    let a = store.create(NewCredential::titled("A")).await.unwrap();
    let b = store.create(NewCredential::titled("B")).await.unwrap();

    store.delete(&a.credential.id).await.unwrap();
    let remaining = stored(&kv);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.credential.id);
}

#[tokio::test]
async fn test_delete_unknown_writes_nothing() {
    let (kv, store) = setup();
    store.create(NewCredential::titled("A")).await.unwrap();
    let writes = kv.write_count();
    store.delete("missing").await.unwrap();
    assert_eq!(kv.write_count(), writes);
}

#[tokio::test]
async fn test_reveal_reports_not_found() {
    let (_, store) = setup();
    assert!(matches!(store.reveal("nope").await, Err(RevealError::NotFound(_))));
    assert!(store.decrypt("nope").await.is_none());
}

#[tokio::test]
async fn test_reveal_reports_tampered_payload() {
    let (kv, store) = setup();
    let issued = store.create(NewCredential::titled("Tamper")).await.unwrap();

    let mut records = stored(&kv);
    let forged = encode_payload("zmk_v1_forged");
    let sum = issued.credential.encryption_metadata.as_ref().unwrap().checksum.clone();
    let body = forged.split(':').nth(1).unwrap();
    records[0].encrypted_payload = Some(format!("zmk_enc:{}:{}", body, sum));
    kv.set(NS, KEYS_ENTRY, &serde_json::to_string(&records).unwrap()).unwrap();

    let err = store.reveal(&issued.credential.id).await.unwrap_err();
    assert!(matches!(err, RevealError::Decrypt(DecryptError::ChecksumMismatch)));
    assert!(store.decrypt(&issued.credential.id).await.is_none());
}

#[tokio::test]
async fn test_legacy_collection_migrated_on_list() {
    let (kv, store) = setup();
    let legacy_secret = generate_secret(32).unwrap();
    let legacy = serde_json::json!([{
        "id": "legacy-1",
        "title": "From an older build",
        "key": legacy_secret,
        "createdAt": "2024-03-01T12:00:00Z",
        "readRules": ["keys"],
        "writeRules": []
    }]);
    kv.set(NS, KEYS_ENTRY, &legacy.to_string()).unwrap();

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].display_value.contains(MASK_GLYPH));
    assert!(!kv.get(NS, KEYS_ENTRY).unwrap().unwrap().contains(&legacy_secret));

    let revealed = store.reveal("legacy-1").await.unwrap();
    assert_eq!(revealed.expose(), legacy_secret);
}

#[tokio::test]
async fn test_concurrent_creates_all_persist() {
    let (kv, store) = setup();
    let store = Arc::new(store);
    let mut handles = Vec::new();
    for i in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.create(NewCredential::titled(format!("key {}", i))).await.unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(stored(&kv).len(), 8);
}
