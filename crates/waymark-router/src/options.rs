//! Router configuration.

use waymark_core::Settings;
use waymark_pattern::PatternOptions;

/// Options shared by [`Router`](crate::Router) and [`SyncRouter`](crate::SyncRouter).
///
/// Hooks that depend on the router flavor (`resolve_route`, `error_handler`)
/// are set on the router itself.
///
/// # Examples
///
/// ```
/// use waymark_router::RouterOptions;
///
/// let options: RouterOptions<()> = RouterOptions::default().base_url("/app");
/// assert_eq!(options.base_url, "/app");
/// assert!(options.pattern.end);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouterOptions<C> {
    /// Prefix every resolved pathname must start with.
    pub base_url: String,
    /// Default caller data, cloned into every resolution.
    pub context: C,
    /// Options used to compile route patterns.
    pub pattern: PatternOptions,
}

impl<C> RouterOptions<C> {
    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the default caller data.
    #[must_use]
    pub fn context(mut self, context: C) -> Self {
        self.context = context;
        self
    }

    /// Sets the pattern options.
    #[must_use]
    pub fn pattern(mut self, pattern: PatternOptions) -> Self {
        self.pattern = pattern;
        self
    }
}

impl<C: Default> RouterOptions<C> {
    /// Builds options from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            context: C::default(),
            pattern: PatternOptions::from_settings(settings),
        }
    }
}
