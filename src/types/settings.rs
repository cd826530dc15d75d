use serde::{Deserialize, Serialize};

/// Top-level console settings container, persisted as `settings.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConsoleSettings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub latency: LatencySettings,
    #[serde(default)]
    pub keys: KeySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the local key-value area lives.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// SQLite file name, relative to the platform data directory.
    pub database_file: String,
    /// Application-scoped namespace every persisted entry is keyed under.
    pub namespace: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "keydeck.db".to_string(),
            namespace: "keydeck".to_string(),
        }
    }
}

/// Simulated round-trip latency per operation, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatencySettings {
    pub list_ms: u64,
    pub create_ms: u64,
    pub update_ms: u64,
    pub revoke_ms: u64,
    pub delete_ms: u64,
    pub regenerate_ms: u64,
    pub decrypt_ms: u64,
    pub encrypt_payload_ms: u64,
    pub decrypt_payload_ms: u64,
    pub stats_ms: u64,
    /// Upper bound of the random extra delay added to every operation.
    pub jitter_ms: u64,
}

impl LatencySettings {
    /// Every operation still suspends, but no wall-clock time passes.
    pub fn instant() -> Self {
        Self {
            list_ms: 0,
            create_ms: 0,
            update_ms: 0,
            revoke_ms: 0,
            delete_ms: 0,
            regenerate_ms: 0,
            decrypt_ms: 0,
            encrypt_payload_ms: 0,
            decrypt_payload_ms: 0,
            stats_ms: 0,
            jitter_ms: 0,
        }
    }
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            list_ms: 150,
            create_ms: 300,
            update_ms: 150,
            revoke_ms: 150,
            delete_ms: 150,
            regenerate_ms: 250,
            decrypt_ms: 100,
            encrypt_payload_ms: 100,
            decrypt_payload_ms: 50,
            stats_ms: 120,
            jitter_ms: 40,
        }
    }
}

/// Key generation and scope policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeySettings {
    /// Length of the random body of generated secrets.
    pub secret_length: usize,
    pub default_read_scopes: Vec<String>,
    /// When set, every write scope is also granted as a read scope.
    pub write_implies_read: bool,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            secret_length: 32,
            default_read_scopes: vec!["keys".to_string()],
            write_implies_read: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// `tracing` env-filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "keydeck=info".to_string(),
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Theme and locale the user picked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    pub theme: ThemeMode,
    pub locale: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            locale: "en".to_string(),
        }
    }
}

/// Application feature switches.
///
/// Stored as camelCase JSON; missing fields fall back to the defaults below,
/// so partially written blobs from older builds still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    // Keys
    pub enable_descriptions: bool,
    pub enable_copy: bool,
    pub enable_revoke: bool,

    // Theme & appearance
    pub enable_dark_mode: bool,
    pub enable_light_mode: bool,
    pub enable_system_theme: bool,
    pub enable_custom_colors: bool,
    pub enable_color_mode_switch: bool,
    pub default_theme: ThemeMode,
    pub enable_user_menu: bool,

    // Language
    pub enable_language_switcher: bool,
    pub enable_auto_detect_language: bool,
    pub enable_translations: bool,

    // UI components
    pub enable_animations: bool,
    pub enable_tooltips: bool,
    pub enable_shortcuts: bool,
    pub enable_dev_tools: bool,
    pub enable_advanced_settings: bool,

    // Dashboard
    pub enable_charts: bool,
    pub enable_stats: bool,
    pub enable_activity_feed: bool,
    pub enable_quick_actions: bool,

    // Modals
    pub enable_modal_backdrop: bool,
    pub enable_keyboard_shortcuts: bool,
    pub enable_click_outside_to_close: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_descriptions: true,
            enable_copy: true,
            enable_revoke: true,
            enable_dark_mode: true,
            enable_light_mode: true,
            enable_system_theme: true,
            enable_custom_colors: false,
            enable_color_mode_switch: true,
            default_theme: ThemeMode::Light,
            enable_user_menu: true,
            enable_language_switcher: true,
            enable_auto_detect_language: true,
            enable_translations: true,
            enable_animations: true,
            enable_tooltips: true,
            enable_shortcuts: true,
            enable_dev_tools: true,
            enable_advanced_settings: false,
            enable_charts: true,
            enable_stats: true,
            enable_activity_feed: true,
            enable_quick_actions: true,
            enable_modal_backdrop: true,
            enable_keyboard_shortcuts: true,
            enable_click_outside_to_close: true,
        }
    }
}

/// Names of the boolean switches in [`FeatureFlags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFlag {
    Descriptions,
    Copy,
    Revoke,
    DarkMode,
    LightMode,
    SystemTheme,
    CustomColors,
    ColorModeSwitch,
    UserMenu,
    LanguageSwitcher,
    AutoDetectLanguage,
    Translations,
    Animations,
    Tooltips,
    Shortcuts,
    DevTools,
    AdvancedSettings,
    Charts,
    Stats,
    ActivityFeed,
    QuickActions,
    ModalBackdrop,
    KeyboardShortcuts,
    ClickOutsideToClose,
}

impl FeatureFlags {
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        *self.switch(flag)
    }

    pub fn set_enabled(&mut self, flag: FeatureFlag, enabled: bool) {
        *self.switch_mut(flag) = enabled;
    }

    fn switch(&self, flag: FeatureFlag) -> &bool {
        match flag {
            FeatureFlag::Descriptions => &self.enable_descriptions,
            FeatureFlag::Copy => &self.enable_copy,
            FeatureFlag::Revoke => &self.enable_revoke,
            FeatureFlag::DarkMode => &self.enable_dark_mode,
            FeatureFlag::LightMode => &self.enable_light_mode,
            FeatureFlag::SystemTheme => &self.enable_system_theme,
            FeatureFlag::CustomColors => &self.enable_custom_colors,
            FeatureFlag::ColorModeSwitch => &self.enable_color_mode_switch,
            FeatureFlag::UserMenu => &self.enable_user_menu,
            FeatureFlag::LanguageSwitcher => &self.enable_language_switcher,
            FeatureFlag::AutoDetectLanguage => &self.enable_auto_detect_language,
            FeatureFlag::Translations => &self.enable_translations,
            FeatureFlag::Animations => &self.enable_animations,
            FeatureFlag::Tooltips => &self.enable_tooltips,
            FeatureFlag::Shortcuts => &self.enable_shortcuts,
            FeatureFlag::DevTools => &self.enable_dev_tools,
            FeatureFlag::AdvancedSettings => &self.enable_advanced_settings,
            FeatureFlag::Charts => &self.enable_charts,
            FeatureFlag::Stats => &self.enable_stats,
            FeatureFlag::ActivityFeed => &self.enable_activity_feed,
            FeatureFlag::QuickActions => &self.enable_quick_actions,
            FeatureFlag::ModalBackdrop => &self.enable_modal_backdrop,
            FeatureFlag::KeyboardShortcuts => &self.enable_keyboard_shortcuts,
            FeatureFlag::ClickOutsideToClose => &self.enable_click_outside_to_close,
        }
    }

    fn switch_mut(&mut self, flag: FeatureFlag) -> &mut bool {
        match flag {
            FeatureFlag::Descriptions => &mut self.enable_descriptions,
            FeatureFlag::Copy => &mut self.enable_copy,
            FeatureFlag::Revoke => &mut self.enable_revoke,
            FeatureFlag::DarkMode => &mut self.enable_dark_mode,
            FeatureFlag::LightMode => &mut self.enable_light_mode,
            FeatureFlag::SystemTheme => &mut self.enable_system_theme,
            FeatureFlag::CustomColors => &mut self.enable_custom_colors,
            FeatureFlag::ColorModeSwitch => &mut self.enable_color_mode_switch,
            FeatureFlag::UserMenu => &mut self.enable_user_menu,
            FeatureFlag::LanguageSwitcher => &mut self.enable_language_switcher,
            FeatureFlag::AutoDetectLanguage => &mut self.enable_auto_detect_language,
            FeatureFlag::Translations => &mut self.enable_translations,
            FeatureFlag::Animations => &mut self.enable_animations,
            FeatureFlag::Tooltips => &mut self.enable_tooltips,
            FeatureFlag::Shortcuts => &mut self.enable_shortcuts,
            FeatureFlag::DevTools => &mut self.enable_dev_tools,
            FeatureFlag::AdvancedSettings => &mut self.enable_advanced_settings,
            FeatureFlag::Charts => &mut self.enable_charts,
            FeatureFlag::Stats => &mut self.enable_stats,
            FeatureFlag::ActivityFeed => &mut self.enable_activity_feed,
            FeatureFlag::QuickActions => &mut self.enable_quick_actions,
            FeatureFlag::ModalBackdrop => &mut self.enable_modal_backdrop,
            FeatureFlag::KeyboardShortcuts => &mut self.enable_keyboard_shortcuts,
            FeatureFlag::ClickOutsideToClose => &mut self.enable_click_outside_to_close,
        }
    }
}
