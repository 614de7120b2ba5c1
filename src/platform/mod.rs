//! Platform specific locations for the SaveKar server's files.
//!
//! Only used when the settings do not name an explicit path.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/savekar` or `~/.config/savekar`
/// - **macOS**: `~/Library/Application Support/SaveKar`
/// - **Windows**: `%APPDATA%/SaveKar`
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

/// Directory holding the SQLite database.
///
/// - **Linux**: `$XDG_DATA_HOME/savekar` or `~/.local/share/savekar`
/// - **macOS**: `~/Library/Application Support/SaveKar/data`
/// - **Windows**: `%LOCALAPPDATA%/SaveKar`
pub fn get_data_dir() -> PathBuf {
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
}

/// Default database file: `<data dir>/savekar.db`.
pub fn default_database_path() -> PathBuf {
    get_data_dir().join("savekar.db")
}
