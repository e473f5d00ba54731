//! Core error types for waymark.
//!
//! This module provides the [`RouterError`] enum covering pattern compilation,
//! route resolution, URL generation, and configuration failures. Every variant
//! maps to a numeric status via [`RouterError::status_code`], so callers that
//! sit behind an HTTP layer can turn a resolution failure into a response
//! without inspecting the variant.

use thiserror::Error;

/// The primary error type for waymark.
///
/// Pattern errors are raised while lexing, parsing, or compiling a path
/// pattern and are never retried. [`RouterError::RouteNotFound`] is the only
/// resolution-time failure produced by the engine itself; anything an action
/// wants to report goes through [`RouterError::Handler`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    // ── Construction ─────────────────────────────────────────────────

    /// The route definition handed to a router is not usable as a tree root.
    #[error("Invalid routes: {0}")]
    InvalidRoutes(String),

    // ── Pattern compilation ──────────────────────────────────────────

    /// The path pattern contains invalid syntax.
    #[error("Malformed pattern: {0}")]
    MalformedPattern(String),

    /// An inline `(...)` pattern is never closed.
    #[error("Unbalanced pattern: {0}")]
    UnbalancedPattern(String),

    /// A `+` or `*` modifier was applied to a parameter with no prefix or suffix.
    #[error("Can not repeat \"{0}\" without a prefix and suffix")]
    UnrepeatableParameter(String),

    /// The generated regular expression was rejected or failed to run.
    #[error("Invalid regex: {0}")]
    InvalidRegex(String),

    // ── Resolution ───────────────────────────────────────────────────

    /// No route action produced a result before the tree was exhausted.
    #[error("Route not found: {pathname}")]
    RouteNotFound {
        /// The pathname that was being resolved.
        pathname: String,
    },

    /// An action failed. The status is chosen by the action.
    #[error("{message}")]
    Handler {
        /// The status code reported to the caller.
        status: u16,
        /// A human-readable description.
        message: String,
    },

    // ── URL generation ───────────────────────────────────────────────

    /// Two routes reachable from the root share the same name.
    #[error("Route \"{0}\" already exists")]
    DuplicateRouteName(String),

    /// No route carries the requested name.
    #[error("Route \"{0}\" not found")]
    RouteNameNotFound(String),

    /// A required parameter was not supplied.
    #[error("Missing required parameter \"{0}\"")]
    MissingParameter(String),

    /// A parameter value has the wrong shape for its token.
    #[error("Invalid parameter value: {0}")]
    InvalidParameterValue(String),

    /// An encoded parameter value does not match its token pattern.
    #[error("Expected all \"{name}\" to match \"{pattern}\", but got \"{value}\"")]
    ParameterPatternMismatch {
        /// The parameter name.
        name: String,
        /// The pattern the value was checked against.
        pattern: String,
        /// The encoded value that failed.
        value: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl RouterError {
    /// Creates an action error with an explicit status code.
    pub fn handler(status: u16, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// Creates the error reported when resolution exhausts the route tree.
    pub fn not_found(pathname: impl Into<String>) -> Self {
        Self::RouteNotFound {
            pathname: pathname.into(),
        }
    }

    /// Returns the status code associated with this error.
    ///
    /// - `RouteNotFound` -> 404
    /// - `Handler` -> whatever the action chose
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::RouteNotFound { .. } => 404,
            Self::Handler { status, .. } => *status,
            Self::InvalidRoutes(_)
            | Self::MalformedPattern(_)
            | Self::UnbalancedPattern(_)
            | Self::UnrepeatableParameter(_)
            | Self::InvalidRegex(_)
            | Self::DuplicateRouteName(_)
            | Self::RouteNameNotFound(_)
            | Self::MissingParameter(_)
            | Self::InvalidParameterValue(_)
            | Self::ParameterPatternMismatch { .. }
            | Self::ConfigurationError(_) => 500,
        }
    }

    /// Returns `true` for errors raised while compiling a pattern.
    pub const fn is_pattern_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedPattern(_)
                | Self::UnbalancedPattern(_)
                | Self::UnrepeatableParameter(_)
                | Self::InvalidRegex(_)
        )
    }
}

/// A convenience type alias for `Result<T, RouterError>`.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RouterError::not_found("/x").status_code(), 404);
        assert_eq!(RouterError::handler(403, "nope").status_code(), 403);
        assert_eq!(RouterError::MalformedPattern("x".into()).status_code(), 500);
        assert_eq!(RouterError::DuplicateRouteName("x".into()).status_code(), 500);
        assert_eq!(RouterError::RouteNameNotFound("x".into()).status_code(), 500);
        assert_eq!(RouterError::InvalidRoutes("x".into()).status_code(), 500);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RouterError::not_found("/missing").to_string(),
            "Route not found: /missing"
        );
        assert_eq!(
            RouterError::RouteNameNotFound("post".into()).to_string(),
            "Route \"post\" not found"
        );
        assert_eq!(RouterError::handler(418, "teapot").to_string(), "teapot");
    }

    #[test]
    fn test_pattern_error_classification() {
        assert!(RouterError::UnrepeatableParameter("a".into()).is_pattern_error());
        assert!(RouterError::UnbalancedPattern("x".into()).is_pattern_error());
        assert!(!RouterError::not_found("/").is_pattern_error());
    }
}
