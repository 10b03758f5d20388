// Leto platform paths
// Resolves where the saved-state database and the reading config live.
//
// `LETO_DATA_DIR` overrides both directories, which keeps tests and embedded
// hosts away from the user's real profile.

use std::env;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "LETO_DATA_DIR";

const APP_DIR: &str = "leto";

/// Returns the directory holding the reading config.
///
/// - **Linux**: `$XDG_CONFIG_HOME/leto` or `~/.config/leto`
/// - **macOS**: `~/Library/Application Support/leto`
/// - **Windows**: `%APPDATA%/leto`
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = data_dir_override() {
        return dir;
    }
    base_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR)
}

/// Returns the directory holding the saved-state database.
///
/// - **Linux**: `$XDG_DATA_HOME/leto` or `~/.local/share/leto`
/// - **macOS**: `~/Library/Application Support/leto`
/// - **Windows**: `%APPDATA%/leto`
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = data_dir_override() {
        return dir;
    }
    base_dir("XDG_DATA_HOME", &[".local", "share"]).join(APP_DIR)
}

fn data_dir_override() -> Option<PathBuf> {
    env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(target_os = "windows")]
fn base_dir(_xdg_var: &str, _home_parts: &[&str]) -> PathBuf {
    env::var_os("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(target_os = "macos")]
fn base_dir(_xdg_var: &str, _home_parts: &[&str]) -> PathBuf {
    home_dir().join("Library").join("Application Support")
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn base_dir(xdg_var: &str, home_parts: &[&str]) -> PathBuf {
    if let Some(xdg) = env::var_os(xdg_var).filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    home_parts
        .iter()
        .fold(home_dir(), |path, part| path.join(part))
}

#[cfg(not(target_os = "windows"))]
fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}
