//! Settings loading from configuration files.
//!
//! This module loads [`Settings`] from TOML files, JSON files, and applies
//! environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `WAYMARK_BASE_URL` | `base_url` |
//! | `WAYMARK_STRICT` | `strict` |
//! | `WAYMARK_SENSITIVE` | `sensitive` |
//! | `WAYMARK_LOG_LEVEL` | `log_level` |
//! | `WAYMARK_DEBUG` | `debug` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use waymark_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/router.toml").unwrap();
//! let settings = settings_loader::from_toml_file_with_env("config/router.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::RouterError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Fields not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, RouterError> {
    toml::from_str(toml_str)
        .map_err(|e| RouterError::ConfigurationError(format!("Failed to parse TOML: {e}")))
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, RouterError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, RouterError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, RouterError> {
    serde_json::from_str(json_str)
        .map_err(|e| RouterError::ConfigurationError(format!("Failed to parse JSON: {e}")))
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, RouterError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `WAYMARK_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Applies overrides from an arbitrary key lookup.
///
/// Boolean values accept "true", "1", and "yes" (case-insensitive); anything
/// else is `false`.
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("WAYMARK_BASE_URL") {
        settings.base_url = val;
    }

    if let Some(val) = lookup("WAYMARK_STRICT") {
        settings.strict = parse_flag(&val);
    }

    if let Some(val) = lookup("WAYMARK_SENSITIVE") {
        settings.sensitive = parse_flag(&val);
    }

    if let Some(val) = lookup("WAYMARK_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("WAYMARK_DEBUG") {
        settings.debug = parse_flag(&val);
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_file(path: &Path, kind: &str) -> Result<String, RouterError> {
    std::fs::read_to_string(path).map_err(|e| {
        RouterError::ConfigurationError(format!(
            "Failed to read {kind} file '{}': {e}",
            path.display()
        ))
    })
}
