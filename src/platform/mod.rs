// keydeck platform paths
// Resolves where settings and the local key-value database live. The
// per-OS defaults can be overridden with `KEYDECK_CONFIG` and
// `KEYDECK_DATA_DIR`.

use std::env;
use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Explicit settings file, bypassing the config directory.
pub const CONFIG_ENV: &str = "KEYDECK_CONFIG";

/// Relocates the data directory.
pub const DATA_DIR_ENV: &str = "KEYDECK_DATA_DIR";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/keydeck` or `~/.config/keydeck`
/// - **macOS**: `~/Library/Application Support/Keydeck`
/// - **Windows**: `%APPDATA%/Keydeck`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the data directory, honouring `KEYDECK_DATA_DIR`.
///
/// - **Linux**: `$XDG_DATA_HOME/keydeck` or `~/.local/share/keydeck`
/// - **macOS**: `~/Library/Application Support/Keydeck/data`
/// - **Windows**: `%LOCALAPPDATA%/Keydeck/data`
pub fn get_data_dir() -> PathBuf {
    resolve_override(env::var_os(DATA_DIR_ENV).map(PathBuf::from), || {
        #[cfg(target_os = "linux")]
        {
            linux::get_data_dir()
        }
        #[cfg(target_os = "macos")]
        {
            macos::get_data_dir()
        }
        #[cfg(target_os = "windows")]
        {
            windows::get_data_dir()
        }
    })
}

/// Path of `settings.json`, honouring `KEYDECK_CONFIG`.
pub fn get_settings_path() -> PathBuf {
    resolve_override(env::var_os(CONFIG_ENV).map(PathBuf::from), || {
        get_config_dir().join("settings.json")
    })
}

/// Resolves a database file name against the data directory. Absolute
/// names are used as given.
pub fn database_path(file_name: &str) -> PathBuf {
    let path = Path::new(file_name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        get_data_dir().join(path)
    }
}

fn resolve_override(explicit: Option<PathBuf>, fallback: impl FnOnce() -> PathBuf) -> PathBuf {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => fallback(),
    }
}
