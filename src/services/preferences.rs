// keydeck Preferences
// Persists the user's theme mode and UI locale in the key-value area.

use std::sync::Arc;

use tracing::debug;

use crate::database::KeyValueStore;
use crate::types::errors::PreferenceError;
use crate::types::settings::{Preferences, ThemeMode};

pub const THEME_ENTRY: &str = "theme";
pub const LOCALE_ENTRY: &str = "lang";

/// Locales the console ships translations for.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "nl", "fr"];

/// Locale used when nothing else applies.
pub const DEFAULT_LOCALE: &str = "en";

/// Trait defining the preferences interface.
pub trait PreferencesServiceTrait {
    fn load(&self) -> Result<Preferences, PreferenceError>;
    fn theme(&self) -> Result<ThemeMode, PreferenceError>;
    fn set_theme(&self, theme: ThemeMode) -> Result<(), PreferenceError>;
    fn toggle_theme(&self) -> Result<ThemeMode, PreferenceError>;
    fn locale(&self) -> Result<String, PreferenceError>;
    fn set_locale(&self, locale: &str) -> Result<(), PreferenceError>;
}

pub struct PreferencesService {
    kv: Arc<dyn KeyValueStore>,
    namespace: String,
    /// Locale reported before the user picked one.
    fallback_locale: String,
}

impl PreferencesService {
    pub fn new(kv: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
            fallback_locale: DEFAULT_LOCALE.to_string(),
        }
    }

    /// Uses the system locale as the fallback instead of English.
    pub fn with_system_locale(mut self) -> Self {
        self.fallback_locale = detect_system_locale();
        self
    }

    pub fn is_supported(locale: &str) -> bool {
        SUPPORTED_LOCALES.contains(&locale)
    }
}

impl PreferencesServiceTrait for PreferencesService {
    fn load(&self) -> Result<Preferences, PreferenceError> {
        Ok(Preferences {
            theme: self.theme()?,
            locale: self.locale()?,
        })
    }

    /// Unknown stored values read as light.
    fn theme(&self) -> Result<ThemeMode, PreferenceError> {
        let stored = self.kv.get(&self.namespace, THEME_ENTRY)?;
        Ok(stored.as_deref().and_then(ThemeMode::parse).unwrap_or_default())
    }

    fn set_theme(&self, theme: ThemeMode) -> Result<(), PreferenceError> {
        self.kv.set(&self.namespace, THEME_ENTRY, theme.as_str())?;
        debug!(theme = theme.as_str(), "theme changed");
        Ok(())
    }

    fn toggle_theme(&self) -> Result<ThemeMode, PreferenceError> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    fn locale(&self) -> Result<String, PreferenceError> {
        let stored = self.kv.get(&self.namespace, LOCALE_ENTRY)?;
        Ok(stored
            .filter(|code| Self::is_supported(code))
            .unwrap_or_else(|| self.fallback_locale.clone()))
    }

    fn set_locale(&self, locale: &str) -> Result<(), PreferenceError> {
        if !Self::is_supported(locale) {
            return Err(PreferenceError::UnsupportedLocale(locale.to_string()));
        }
        self.kv.set(&self.namespace, LOCALE_ENTRY, locale)?;
        debug!(locale, "locale changed");
        Ok(())
    }
}

/// Detects the system locale from `LANG` (e.g. `nl_NL.UTF-8`).
pub fn detect_system_locale() -> String {
    locale_from_lang(&std::env::var("LANG").unwrap_or_default())
}

/// Maps a `LANG`-style value to a supported locale code, else the default.
pub fn locale_from_lang(lang: &str) -> String {
    let code = lang
        .split(['_', '.', '-'])
        .next()
        .unwrap_or("")
        .to_lowercase();
    if PreferencesService::is_supported(&code) {
        code
    } else {
        DEFAULT_LOCALE.to_string()
    }
}
