//! Logging integration for waymark.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-resolution spans.

use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::Settings;

/// Builds the event filter for `settings.log_level`.
///
/// An unparsable directive falls back to `info`.
pub fn log_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber described by `settings`.
///
/// In debug mode events are printed in a pretty, human-readable format with
/// source locations; otherwise each event is one JSON line. Returns `false`
/// if a global subscriber was already installed, in which case nothing
/// changes.
///
/// # Examples
///
/// ```
/// use waymark_core::logging::setup_logging;
/// use waymark_core::settings::Settings;
///
/// let settings = Settings {
///     log_level: "waymark_router=debug".into(),
///     debug: true,
///     ..Settings::default()
/// };
/// setup_logging(&settings);
/// assert!(!setup_logging(&settings));
/// ```
pub fn setup_logging(settings: &Settings) -> bool {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(log_filter(settings))
        .with_target(true);

    if settings.debug {
        builder
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .is_ok()
    } else {
        builder.json().try_init().is_ok()
    }
}

/// Creates a tracing span for one resolution.
///
/// Every event emitted while matching and running actions for `pathname`
/// is recorded inside this span.
///
/// # Examples
///
/// ```
/// use waymark_core::logging::resolve_span;
///
/// let span = resolve_span("/users/42");
/// let _guard = span.enter();
/// tracing::debug!("resolving");
/// ```
pub fn resolve_span(pathname: &str) -> tracing::Span {
    tracing::debug_span!("resolve", pathname = pathname)
}
