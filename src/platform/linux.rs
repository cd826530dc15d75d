// keydeck platform paths for Linux
// Config: ~/.config/keydeck
// Data:   ~/.local/share/keydeck

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// `$XDG_CONFIG_HOME/keydeck`, else `~/.config/keydeck`.
pub fn get_config_dir() -> PathBuf {
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("keydeck"),
        _ => home_dir().join(".config").join("keydeck"),
    }
}

/// `$XDG_DATA_HOME/keydeck`, else `~/.local/share/keydeck`.
pub fn get_data_dir() -> PathBuf {
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join("keydeck"),
        _ => home_dir().join(".local").join("share").join("keydeck"),
    }
}
