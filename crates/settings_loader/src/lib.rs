//! # Settings Loader
//!
//! Loads the server settings of the expense tracker from a JSON file.
//! Every field is optional in the file; missing ones fall back to the
//! defaults defined on [`models::Settings`] (listen on `127.0.0.1:8000`,
//! keep the store in memory).
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Load settings from a specific path
//! let settings = settings_loader::load_settings("config/settings.json")?;
//!
//! // Explicit path first, then `settings.json`, then built-in defaults
//! let path = Some(PathBuf::from("config/settings.json"));
//! let settings = settings_loader::load_settings_or_default(path.as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::Settings;

/// Name of the settings file looked up in the current directory.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from the default location (settings.json in the current directory)
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Tries the provided path, then the default location.
///
/// A provided path that exists but cannot be parsed is an error; a missing file
/// just moves on to the next candidate. Returns `None` when no file is found.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    if let Some(settings_path) = path {
        if settings_file_exists(settings_path) {
            return load_settings(settings_path).map(Some);
        }
        tracing::warn!(
            "Settings file {} not found, trying {}",
            settings_path.display(),
            DEFAULT_SETTINGS_FILE
        );
    }

    if default_settings_exist() {
        return load_default_settings().map(Some);
    }

    Ok(None)
}

/// Same as [`load_settings_with_fallback`] but falls back to built-in defaults.
pub fn load_settings_or_default(path: Option<&PathBuf>) -> Result<Settings> {
    Ok(load_settings_with_fallback(path)?.unwrap_or_default())
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

/// Checks if the default settings file (settings.json) exists
pub fn default_settings_exist() -> bool {
    settings_file_exists(DEFAULT_SETTINGS_FILE)
}
