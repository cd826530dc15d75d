//! keydeck: local-first API key console.
//!
//! Entry point: runs a console demo of every component against an in-memory
//! key-value area with instant latency. The UI-facing surface is the
//! `keydeck-rpc` binary.

use std::sync::Arc;

use anyhow::Context;

use keydeck::app::App;
use keydeck::database::{Database, KeyValueStore, SqliteKvStore};
use keydeck::logging;
use keydeck::managers::session_manager::SessionManagerTrait;
use keydeck::services::checksum::{checksum, generate_secret, mask_secret, validate_format};
use keydeck::services::encryption_service::EncryptionService;
use keydeck::services::feature_flags::FeatureFlagServiceTrait;
use keydeck::services::preferences::PreferencesServiceTrait;
use keydeck::types::credential::{CredentialPatch, NewCredential};
use keydeck::types::settings::{ConsoleSettings, FeatureFlag, LatencySettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ConsoleSettings {
        latency: LatencySettings::instant(),
        ..ConsoleSettings::default()
    };
    let _ = logging::init(&settings.logging.filter);

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              keydeck v{}: Demo Mode                     ║", env!("CARGO_PKG_VERSION"));
    println!("║     API key lifecycle with simulated encryption              ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    demo_database()?;
    demo_checksum()?;
    demo_encryption().await?;
    let app = App::in_memory(settings);
    demo_startup(&app).await?;
    demo_keys(&app).await?;
    demo_flags_and_preferences(&app)?;
    demo_stats(&app).await?;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ All components demonstrated successfully!");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn demo_database() -> anyhow::Result<()> {
    section("Database Layer");
    let db = Arc::new(Database::open_in_memory().context("in-memory database")?);
    let kv = SqliteKvStore::new(db);
    kv.set("demo", "greeting", "hello")?;
    println!("  kv_entries round-trip: {:?}", kv.get("demo", "greeting")?);
    println!();
    Ok(())
}

fn demo_checksum() -> anyhow::Result<()> {
    section("Checksum & Key Format");
    let secret = generate_secret(32)?;
    println!("  Generated:   {}…", &secret[..8]);
    println!("  Masked:      {}", mask_secret(&secret));
    println!("  Valid:       {}", validate_format(&secret));
    println!("  'garbage':   {}", validate_format("garbage"));
    println!("  checksum(hello) = {}", checksum("hello"));
    println!();
    Ok(())
}

async fn demo_encryption() -> anyhow::Result<()> {
    section("Simulated Encryption");
    let service = EncryptionService::instant();
    let payload = service.encrypt("zmk_v1_demo").await;
    println!("  Payload:     {}", payload);
    let opened = service.decrypt(&payload).await?;
    println!("  Round-trip:  {}", opened.expose() == "zmk_v1_demo");
    let tampered = format!("{}0", &payload[..payload.len() - 1]);
    match service.decrypt(&tampered).await {
        Ok(_) => println!("  Tampered:    unexpectedly opened"),
        Err(e) => println!("  Tampered:    {}", e),
    }
    println!("  Scheme:      {:?}", service.describe_scheme());
    println!();
    Ok(())
}

async fn demo_startup(app: &App) -> anyhow::Result<()> {
    section("App Core");
    let report = app.startup(Some("ff.enableAdvancedSettings=true")).await?;
    println!("  Startup:     {:?}", report);
    let user = app.sessions.signin("Demo User")?;
    println!("  Signed in:   {} (expires {})", user.name, user.expires_at);
    println!();
    Ok(())
}

async fn demo_keys(app: &App) -> anyhow::Result<()> {
    section("Key Lifecycle");
    let issued = app
        .keys
        .create(NewCredential::titled("Test Key").with_description("demo").with_scopes(["keys"], ["billing"]))
        .await?;
    let id = issued.credential.id.clone();
    println!("  Created:     {} {}", issued.credential.title, issued.credential.display_value);
    println!("  Read scopes: {:?}", issued.credential.read_scopes);

    app.keys.update(&id, CredentialPatch::title("Renamed Key")).await?;
    let revoked = app.keys.revoke(&id).await?.context("key vanished")?;
    println!("  Revoked at:  {:?}", revoked.revoked_at);

    let rotated = app.keys.regenerate(&id).await?.context("key vanished")?;
    let copied = app.keys.decrypt(&id).await.context("decrypt failed")?;
    println!("  Regenerated: {}", rotated.credential.display_value);
    println!("  Copy works:  {}", copied == rotated.secret);

    let second = app.keys.create(NewCredential::titled("Throwaway")).await?;
    app.keys.delete(&second.credential.id).await?;
    let state = app.keys.state();
    println!("  Collection:  {} item(s), loading={}, revision={}", state.items.len(), state.is_loading, app.keys.revision());
    println!();
    Ok(())
}

fn demo_flags_and_preferences(app: &App) -> anyhow::Result<()> {
    section("Feature Flags & Preferences");
    println!("  Advanced settings: {}", app.flags.is_enabled(FeatureFlag::AdvancedSettings));
    app.flags.set_flag(FeatureFlag::Animations, false)?;
    println!("  Animations:        {}", app.flags.is_enabled(FeatureFlag::Animations));
    let theme = app.preferences.toggle_theme()?;
    app.preferences.set_locale("nl")?;
    println!("  Preferences:       {:?} / {:?}", theme, app.preferences.locale()?);
    println!();
    Ok(())
}

async fn demo_stats(app: &App) -> anyhow::Result<()> {
    section("Usage Statistics");
    let ids: Vec<String> = app.keys.state().items.iter().map(|k| k.id.clone()).collect();
    for id in &ids {
        let stats = app.stats.key_stats(id).await?;
        println!("  {}: {} calls, {} errors", id, stats.total_calls, stats.total_errors);
    }
    let total = app.stats.aggregate().await?;
    println!("  Aggregate:   {} calls over {} hours", total.total_calls, total.hourly_data.len());
    println!();
    Ok(())
}
