//! Router settings.
//!
//! [`Settings`] holds the data-only part of a router's configuration: the base
//! URL, the pattern compiler options, and logging preferences. Callable hooks
//! (custom encoders, error handlers) live on the router options in
//! `waymark-router`, which can be built from a `Settings` value.

use serde::{Deserialize, Serialize};

/// The default set of characters treated as segment delimiters.
pub const DEFAULT_DELIMITER: &str = "/#?";

/// The default set of characters a parameter may absorb as its prefix.
pub const DEFAULT_PREFIXES: &str = "./";

/// The complete set of router settings.
///
/// # Examples
///
/// ```
/// use waymark_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.base_url.is_empty());
/// assert_eq!(settings.delimiter, "/#?");
/// assert!(!settings.sensitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Routing ──────────────────────────────────────────────────────

    /// Prefix every resolved pathname must start with, and every generated URL gets.
    pub base_url: String,
    /// When `true`, a trailing delimiter is not optional.
    pub strict: bool,
    /// When `true`, matching is case sensitive.
    pub sensitive: bool,
    /// Characters that separate path segments.
    pub delimiter: String,
    /// Characters a parameter absorbs as its prefix when directly preceding it.
    pub prefixes: String,
    /// Characters that may terminate a match in place of end-of-input.
    pub ends_with: String,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter directive (e.g. "info", "waymark_router=debug").
    pub log_level: String,
    /// Whether to use human-readable log output.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            strict: false,
            sensitive: false,
            delimiter: DEFAULT_DELIMITER.to_string(),
            prefixes: DEFAULT_PREFIXES.to_string(),
            ends_with: String::new(),
            log_level: "info".to_string(),
            debug: false,
        }
    }
}
