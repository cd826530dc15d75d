//! RPC method handler for the keydeck JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches one call to the services owned by [`App`].
//! Keys and stats are only served while a user is signed in.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::session_manager::SessionManagerTrait;
use crate::services::feature_flags::FeatureFlagServiceTrait;
use crate::services::preferences::PreferencesServiceTrait;
use crate::types::credential::{CredentialPatch, IssuedCredential, NewCredential};
use crate::types::settings::{FeatureFlag, ThemeMode};

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// The one response that carries a plaintext secret.
fn issued_json(issued: &IssuedCredential) -> Result<Value, String> {
    Ok(json!({
        "key": to_json(&issued.credential)?,
        "secret": issued.secret.expose(),
    }))
}

fn require_user(app: &App) -> Result<(), String> {
    match app.sessions.is_authenticated() {
        Ok(true) => Ok(()),
        Ok(false) => Err("not authenticated".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn require_flag(app: &App, flag: FeatureFlag, what: &str) -> Result<(), String> {
    if app.flags.is_enabled(flag) {
        Ok(())
    } else {
        Err(format!("{} is disabled", what))
    }
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    if method.starts_with("keys.") || method.starts_with("stats.") {
        require_user(app)?;
    }

    match method {
        // ─── Auth ───
        "auth.signin" => {
            let name = str_param(params, "name")?;
            let user = app.sessions.signin(name).map_err(|e| e.to_string())?;
            to_json(&user)
        }
        "auth.guest" => {
            let user = app.sessions.signin_guest().map_err(|e| e.to_string())?;
            to_json(&user)
        }
        "auth.signout" => {
            app.sessions.signout().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.current" => {
            let user = app.sessions.current_user().map_err(|e| e.to_string())?;
            to_json(&user)
        }

        // ─── Keys ───
        "keys.load" => {
            app.keys.load().await.map_err(|e| e.to_string())?;
            let state = app.keys.state();
            Ok(json!({"isLoading": state.is_loading, "items": to_json(&state.items)?}))
        }
        "keys.list" => to_json(&app.keys.state().items),
        "keys.state" => {
            let state = app.keys.state();
            Ok(json!({
                "isLoading": state.is_loading,
                "count": state.items.len(),
                "revision": app.keys.revision(),
            }))
        }
        "keys.scheme" => to_json(&app.keys.describe_scheme()),
        "keys.create" => {
            let mut input: NewCredential = parse_params(params)?;
            if !app.flags.is_enabled(FeatureFlag::Descriptions) {
                input.description = None;
            }
            let issued = app.keys.create(input).await.map_err(|e| e.to_string())?;
            issued_json(&issued)
        }
        "keys.update" => {
            let id = str_param(params, "id")?;
            let patch: CredentialPatch = parse_params(params)?;
            let updated = app.keys.update(id, patch).await.map_err(|e| e.to_string())?;
            to_json(&updated)
        }
        "keys.revoke" => {
            require_flag(app, FeatureFlag::Revoke, "revoke")?;
            let id = str_param(params, "id")?;
            let revoked = app.keys.revoke(id).await.map_err(|e| e.to_string())?;
            to_json(&revoked)
        }
        "keys.regenerate" => {
            let id = str_param(params, "id")?;
            match app.keys.regenerate(id).await.map_err(|e| e.to_string())? {
                Some(issued) => issued_json(&issued),
                None => Ok(Value::Null),
            }
        }
        "keys.delete" => {
            let id = str_param(params, "id")?;
            app.keys.delete(id).await.map_err(|e| e.to_string())?;
            app.stats.forget(id).await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "keys.decrypt" => {
            require_flag(app, FeatureFlag::Copy, "copy")?;
            let id = str_param(params, "id")?;
            let secret = app.keys.reveal(id).await.map_err(|e| format!("decrypt failed: {}", e))?;
            Ok(json!({"secret": secret.expose()}))
        }

        // ─── Feature flags ───
        "flags.get" => to_json(&app.flags.get_all()),
        "flags.set" => {
            let patch = params.as_object().ok_or("params must be an object")?;
            let flags = app.flags.set(patch).map_err(|e| e.to_string())?;
            to_json(&flags)
        }

        // ─── Preferences ───
        "prefs.get" => {
            let prefs = app.preferences.load().map_err(|e| e.to_string())?;
            to_json(&prefs)
        }
        "prefs.set_theme" => {
            let raw = str_param(params, "theme")?;
            let theme = ThemeMode::parse(raw).ok_or_else(|| format!("unknown theme: {}", raw))?;
            app.preferences.set_theme(theme).map_err(|e| e.to_string())?;
            Ok(json!({"theme": theme}))
        }
        "prefs.toggle_theme" => {
            let theme = app.preferences.toggle_theme().map_err(|e| e.to_string())?;
            Ok(json!({"theme": theme}))
        }
        "prefs.set_locale" => {
            let locale = str_param(params, "locale")?;
            app.preferences.set_locale(locale).map_err(|e| e.to_string())?;
            Ok(json!({"locale": locale}))
        }

        // ─── Usage stats ───
        "stats.key" => {
            let id = str_param(params, "id")?;
            if !app.keys.state().items.iter().any(|k| k.id == id) {
                return Err(format!("key not found: {}", id));
            }
            let stats = app.stats.key_stats(id).await.map_err(|e| e.to_string())?;
            to_json(&stats)
        }
        "stats.aggregate" => {
            let stats = app.stats.aggregate().await.map_err(|e| e.to_string())?;
            to_json(&stats)
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
