//! Platform-specific paths for profiles and configuration.
//!
//! - **User config**: `~/.config/specsep/` (Linux), `~/Library/Application Support/specsep/` (macOS), `%APPDATA%\specsep\` (Windows)
//! - **User profiles**: `profiles/` under the user config directory
//! - **Default settings file**: `settings.toml` under the user config directory

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "specsep";

/// Subdirectory name for profiles.
const PROFILES_SUBDIR: &str = "profiles";

/// File name of the default settings file.
const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to `./specsep` if the platform config directory cannot be
/// determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific profiles directory.
pub fn user_profiles_dir() -> PathBuf {
    user_config_dir().join(PROFILES_SUBDIR)
}

/// Path of the user's default settings file (may not exist).
pub fn default_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Find a profile file by name.
///
/// `name` may be a path to an existing file, or a profile name (with or
/// without `.toml`) looked up in [`user_profiles_dir`].
pub fn find_profile(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let user_path = user_profiles_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// Ensure the user profiles directory exists.
pub fn ensure_user_profiles_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_profiles_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// List profile files in the user profiles directory.
pub fn list_user_profiles() -> Vec<PathBuf> {
    list_profiles_in_dir(&user_profiles_dir())
}

/// `.toml` files directly inside `dir`; empty if it cannot be read.
pub fn list_profiles_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut profiles: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    profiles.sort();
    profiles
}

/// Profile name from a file path (the file stem).
pub fn profile_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
