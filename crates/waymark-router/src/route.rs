//! Route definitions.
//!
//! A [`Route`] is the user-facing description of one node in a route tree:
//! its path, an optional name, an optional action, caller metadata, and
//! ordered children. Routers take ownership of route definitions and flatten
//! them into a [`RouteTree`](crate::tree::RouteTree).

use std::collections::HashMap;
use std::fmt;

use fancy_regex::Regex;
use waymark_pattern::PathInput;

/// The path of a route.
#[derive(Debug, Clone, Default)]
pub enum RoutePath {
    /// No path. Matches the empty string, so the node always matches.
    #[default]
    Empty,
    /// A pattern string such as `/users/:id`.
    Pattern(String),
    /// Alternative patterns. The first one is used for URL generation.
    Alternatives(Vec<String>),
    /// A pre-built regex.
    Regex(Regex),
}

impl RoutePath {
    /// Returns the template contributed to generated URLs.
    ///
    /// Alternatives contribute their first entry. Regex paths contribute nothing.
    pub fn template(&self) -> &str {
        match self {
            Self::Empty | Self::Regex(_) => "",
            Self::Pattern(pattern) => pattern,
            Self::Alternatives(patterns) => patterns.first().map_or("", String::as_str),
        }
    }

    pub(crate) fn as_input(&self) -> PathInput<'_> {
        match self {
            Self::Empty => PathInput::Pattern(""),
            Self::Pattern(pattern) => PathInput::Pattern(pattern),
            Self::Alternatives(patterns) => PathInput::Alternatives(patterns),
            Self::Regex(regex) => PathInput::Regex(regex),
        }
    }
}

impl From<&str> for RoutePath {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_string())
    }
}

impl From<String> for RoutePath {
    fn from(pattern: String) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<Vec<String>> for RoutePath {
    fn from(patterns: Vec<String>) -> Self {
        Self::Alternatives(patterns)
    }
}

impl From<Vec<&str>> for RoutePath {
    fn from(patterns: Vec<&str>) -> Self {
        Self::Alternatives(patterns.into_iter().map(ToString::to_string).collect())
    }
}

impl From<Regex> for RoutePath {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

/// A route definition, built with chained setters.
///
/// `A` is the action type of the router the route is meant for; see
/// [`action`](crate::action) and [`sync::action`](crate::sync::action).
///
/// # Examples
///
/// ```
/// use waymark_router::{Route, RoutePath};
///
/// let route: Route<()> = Route::new("/users")
///     .name("users")
///     .meta("component", serde_json::json!("UserList"))
///     .child(Route::new("/:id").name("user"));
/// assert_eq!(route.children_len(), 1);
/// ```
pub struct Route<A> {
    pub(crate) path: RoutePath,
    pub(crate) name: Option<String>,
    pub(crate) action: Option<A>,
    pub(crate) children: Vec<Route<A>>,
    pub(crate) meta: HashMap<String, serde_json::Value>,
}

impl<A> fmt::Debug for Route<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("action", &self.action.is_some())
            .field("children", &self.children)
            .field("meta", &self.meta)
            .finish()
    }
}

impl<A> Default for Route<A> {
    fn default() -> Self {
        Self {
            path: RoutePath::Empty,
            name: None,
            action: None,
            children: Vec::new(),
            meta: HashMap::new(),
        }
    }
}

impl<A> Route<A> {
    /// Creates a route with the given path.
    pub fn new(path: impl Into<RoutePath>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Sets the route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the action.
    #[must_use]
    pub fn action(mut self, action: A) -> Self {
        self.action = Some(action);
        self
    }

    /// Appends a child route.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends several child routes.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attaches a metadata value.
    #[must_use]
    pub fn meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Returns the path.
    pub const fn path(&self) -> &RoutePath {
        &self.path
    }

    /// Returns the number of direct children.
    pub fn children_len(&self) -> usize {
        self.children.len()
    }
}

/// The route input accepted by routers.
#[derive(Debug)]
pub enum Routes<A> {
    /// A single root route.
    Root(Route<A>),
    /// Top-level routes placed under a synthesized root with an empty path.
    List(Vec<Route<A>>),
}

impl<A> From<Route<A>> for Routes<A> {
    fn from(route: Route<A>) -> Self {
        Self::Root(route)
    }
}

impl<A> From<Vec<Route<A>>> for Routes<A> {
    fn from(routes: Vec<Route<A>>) -> Self {
        Self::List(routes)
    }
}

impl<A> Routes<A> {
    pub(crate) fn into_root(self) -> Route<A> {
        match self {
            Self::Root(route) => route,
            Self::List(routes) => Route::default().children(routes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template() {
        assert_eq!(RoutePath::Empty.template(), "");
        assert_eq!(RoutePath::from("/a").template(), "/a");
        assert_eq!(RoutePath::from(vec!["/a", "/b"]).template(), "/a");
        assert_eq!(RoutePath::Alternatives(Vec::new()).template(), "");
        let regex = Regex::new("^/x").unwrap();
        assert_eq!(RoutePath::from(regex).template(), "");
    }

    #[test]
    fn test_builder() {
        let route: Route<u8> = Route::new("/a")
            .name("a")
            .action(1)
            .children([Route::new("/b"), Route::new("/c")])
            .meta("title", serde_json::json!("A"));
        assert_eq!(route.name.as_deref(), Some("a"));
        assert_eq!(route.action, Some(1));
        assert_eq!(route.children_len(), 2);
        assert_eq!(route.meta["title"], "A");
    }

    #[test]
    fn test_list_gets_empty_root() {
        let routes: Routes<()> = vec![Route::new("/a"), Route::new("/b")].into();
        let root = routes.into_root();
        assert!(matches!(root.path, RoutePath::Empty));
        assert_eq!(root.children_len(), 2);
    }
}
