//! URL generation from named routes.
//!
//! [`UrlGenerator`] builds a path for a route name by joining the templates of
//! the route and its ancestors and filling in parameters. Route names are
//! looked up in a cache that is rebuilt from the router's current tree on a
//! miss, so routes added after the generator was created are found; duplicate
//! names are only detected during such a rebuild.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;
use waymark_core::{RouterError, RouterResult};
use waymark_pattern::{
    compile, encode_component, Params, PathFunction, PatternOptions, Token, Transform,
};

use crate::resolver::Router;
use crate::sync::SyncRouter;
use crate::tree::{RouteId, RouteTree};

/// Serializes leftover parameters into a query string.
pub type QueryHook = Arc<dyn Fn(&Params) -> String + Send + Sync>;

/// Options for [`UrlGenerator`].
#[derive(Clone, Default)]
pub struct UrlOptions {
    /// When set, names are registered as `parent<sep>child`, built from the
    /// nearest named ancestor.
    pub unique_route_name_sep: Option<String>,
    /// Encodes parameter values. Defaults to URI component encoding.
    pub encode: Option<Transform>,
    /// Turns parameters the template does not use into a query string.
    pub stringify_query_params: Option<QueryHook>,
}

impl fmt::Debug for UrlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlOptions")
            .field("unique_route_name_sep", &self.unique_route_name_sep)
            .field("encode", &self.encode.is_some())
            .field("stringify_query_params", &self.stringify_query_params.is_some())
            .finish()
    }
}

impl UrlOptions {
    /// Sets the separator for composite route names.
    #[must_use]
    pub fn unique_route_name_sep(mut self, sep: impl Into<String>) -> Self {
        self.unique_route_name_sep = Some(sep.into());
        self
    }

    /// Sets the value encoder.
    #[must_use]
    pub fn encode(mut self, encode: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.encode = Some(Arc::new(encode));
        self
    }

    /// Sets the query string hook.
    #[must_use]
    pub fn stringify_query_params(
        mut self,
        hook: impl Fn(&Params) -> String + Send + Sync + 'static,
    ) -> Self {
        self.stringify_query_params = Some(Arc::new(hook));
        self
    }
}

/// The parts of a route tree URL generation needs.
#[derive(Debug, Clone)]
pub struct RouteOutline {
    base_url: String,
    root: RouteId,
    nodes: Vec<OutlineNode>,
    pattern: PatternOptions,
}

#[derive(Debug, Clone)]
struct OutlineNode {
    name: Option<String>,
    template: String,
    parent: Option<RouteId>,
    children: Vec<RouteId>,
}

impl RouteOutline {
    /// Captures the outline of `tree`.
    pub fn from_tree<A>(tree: &RouteTree<A>, base_url: &str) -> Self {
        let nodes = tree
            .ids()
            .map(|id| {
                let node = tree.node(id);
                OutlineNode {
                    name: node.name().map(ToString::to_string),
                    template: node.path().template().to_string(),
                    parent: node.parent(),
                    children: node.children().to_vec(),
                }
            })
            .collect();
        Self {
            base_url: base_url.to_string(),
            root: tree.root(),
            nodes,
            pattern: tree.options().clone(),
        }
    }

    fn node(&self, id: RouteId) -> &OutlineNode {
        &self.nodes[id.index()]
    }
}

/// A route outline shared between a router and its URL generators.
///
/// The router replaces the outline whenever its tree changes. Clones share
/// the same slot.
#[derive(Debug, Clone)]
pub struct SharedOutline(Arc<RwLock<Arc<RouteOutline>>>);

impl SharedOutline {
    pub(crate) fn new(outline: RouteOutline) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(outline))))
    }

    /// Returns the outline as it is now.
    pub fn current(&self) -> Arc<RouteOutline> {
        Arc::clone(&self.0.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(crate) fn replace(&self, outline: RouteOutline) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(outline);
    }

    /// A slot of its own holding the current outline.
    pub(crate) fn detach(&self) -> Self {
        Self(Arc::new(RwLock::new(self.current())))
    }
}

/// Anything a [`UrlGenerator`] can be built from.
pub trait RouteSource {
    /// Returns the live outline of the source's route tree.
    fn shared_outline(&self) -> SharedOutline;
}

impl<C, R> RouteSource for Router<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Send + 'static,
{
    fn shared_outline(&self) -> SharedOutline {
        self.outline().clone()
    }
}

impl<C, R> RouteSource for SyncRouter<C, R>
where
    C: Clone + 'static,
    R: 'static,
{
    fn shared_outline(&self) -> SharedOutline {
        self.outline().clone()
    }
}

struct Template {
    function: PathFunction,
    keys: HashSet<String>,
}

struct Cache {
    outline: Arc<RouteOutline>,
    names: HashMap<String, RouteId>,
    templates: HashMap<RouteId, Arc<Template>>,
}

/// Generates URLs for named routes.
///
/// Route ids are never reused, so cached templates stay valid when the
/// router's tree grows.
///
/// # Examples
///
/// ```
/// use waymark_pattern::{params, ParamValue};
/// use waymark_router::sync::SyncRouter;
/// use waymark_router::{Route, RouterOptions, UrlGenerator, UrlOptions};
///
/// let router: SyncRouter<(), ()> = SyncRouter::new(
///     vec![Route::new("/post/:id").name("post")],
///     RouterOptions::default().base_url("/base"),
/// )
/// .unwrap();
/// let urls = UrlGenerator::new(&router, UrlOptions::default());
/// let url = urls.url("post", &params([("id", ParamValue::from("12"))])).unwrap();
/// assert_eq!(url, "/base/post/12");
/// ```
pub struct UrlGenerator {
    outline: SharedOutline,
    options: UrlOptions,
    pattern: PatternOptions,
    cache: Mutex<Cache>,
}

impl fmt::Debug for UrlGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlGenerator")
            .field("outline", &self.outline)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl UrlGenerator {
    /// Creates a generator for `source`.
    pub fn new(source: &impl RouteSource, options: UrlOptions) -> Self {
        let outline = source.shared_outline();
        let current = outline.current();
        let encode = options
            .encode
            .clone()
            .unwrap_or_else(|| Arc::new(encode_component));
        let mut pattern = PatternOptions::default()
            .delimiter(current.pattern.delimiter.clone())
            .prefixes(current.pattern.prefixes.clone())
            .sensitive(current.pattern.sensitive);
        pattern.encode = Some(encode);
        Self {
            outline,
            options,
            pattern,
            cache: Mutex::new(Cache {
                outline: current,
                names: HashMap::new(),
                templates: HashMap::new(),
            }),
        }
    }

    /// Builds the URL for the route named `name`.
    ///
    /// Parameters the route template does not use are passed to the query
    /// hook, if one is configured. What ends up in the query string is up to
    /// the hook.
    ///
    /// # Errors
    ///
    /// - [`RouterError::RouteNameNotFound`] if no route has that name.
    /// - [`RouterError::DuplicateRouteName`] if rebuilding the name cache
    ///   finds two routes with the same name.
    /// - Any error from filling the template, such as
    ///   [`RouterError::MissingParameter`].
    pub fn url(&self, name: &str, params: &Params) -> RouterResult<String> {
        let (template, base_url) = self.template_for(name)?;

        let path = template.function.to_path(params)?;
        let mut url = format!("{base_url}{path}");
        if url.is_empty() {
            url.push('/');
        }

        if let Some(hook) = &self.options.stringify_query_params {
            let query: Params = params
                .iter()
                .filter(|(key, _)| !template.keys.contains(*key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            let query = hook(&query);
            if !query.is_empty() {
                if !query.starts_with('?') {
                    url.push('?');
                }
                url.push_str(&query);
            }
        }

        Ok(url)
    }

    fn template_for(&self, name: &str) -> RouterResult<(Arc<Template>, String)> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        let id = match cache.names.get(name).copied() {
            Some(id) => id,
            None => {
                let outline = self.outline.current();
                cache.names = self.collect_names(&outline)?;
                cache.outline = outline;
                *cache
                    .names
                    .get(name)
                    .ok_or_else(|| RouterError::RouteNameNotFound(name.to_string()))?
            }
        };

        let base_url = cache.outline.base_url.clone();
        if let Some(template) = cache.templates.get(&id) {
            return Ok((Arc::clone(template), base_url));
        }

        let mut full = String::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = cache.outline.node(node_id);
            full.insert_str(0, &node.template);
            current = node.parent;
        }
        let function = compile(&full, &self.pattern)?;
        let keys = function
            .tokens()
            .iter()
            .filter_map(Token::as_key)
            .map(|key| key.name.clone())
            .collect();
        let template = Arc::new(Template { function, keys });
        cache.templates.insert(id, Arc::clone(&template));
        Ok((template, base_url))
    }

    /// Walks the whole tree and registers every named route.
    fn collect_names(&self, outline: &RouteOutline) -> RouterResult<HashMap<String, RouteId>> {
        debug!(routes = outline.nodes.len(), "rebuilding route name cache");
        let sep = self.options.unique_route_name_sep.as_deref();
        let mut names = HashMap::new();
        let root = outline.root;
        let mut stack = vec![(root, outline.node(root).name.clone())];

        while let Some((id, full_name)) = stack.pop() {
            let node = outline.node(id);
            if let (Some(_), Some(full_name)) = (&node.name, &full_name) {
                if names.insert(full_name.clone(), id).is_some() {
                    return Err(RouterError::DuplicateRouteName(full_name.clone()));
                }
            }
            for &child in node.children.iter().rev() {
                let child_name = outline.node(child).name.as_deref();
                let child_full = match (sep, &full_name, child_name) {
                    (Some(sep), Some(parent), Some(child)) => Some(format!("{parent}{sep}{child}")),
                    (Some(_), Some(parent), None) => Some(parent.clone()),
                    (_, _, child) => child.map(ToString::to_string),
                };
                stack.push((child, child_full));
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use waymark_pattern::{params, ParamValue};

    use super::*;
    use crate::route::Route;
    use crate::RouterOptions;

    fn router(
        routes: Vec<Route<crate::sync::SyncAction<(), ()>>>,
        base_url: &str,
    ) -> SyncRouter<(), ()> {
        SyncRouter::new(routes, RouterOptions::default().base_url(base_url)).unwrap()
    }

    #[test]
    fn test_nested_template() {
        let r = router(
            vec![Route::new("/users").name("users").child(Route::new("/:id").name("user"))],
            "",
        );
        let urls = UrlGenerator::new(&r, UrlOptions::default());
        assert_eq!(urls.url("users", &Params::new()).unwrap(), "/users");
        assert_eq!(
            urls.url("user", &params([("id", ParamValue::from("7"))])).unwrap(),
            "/users/7"
        );
    }

    #[test]
    fn test_empty_url_becomes_slash() {
        let r = router(vec![Route::new("").name("home")], "");
        let urls = UrlGenerator::new(&r, UrlOptions::default());
        assert_eq!(urls.url("home", &Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_first_alternative_is_used() {
        let r = router(vec![Route::new(vec!["/a", "/b"]).name("ab")], "");
        let urls = UrlGenerator::new(&r, UrlOptions::default());
        assert_eq!(urls.url("ab", &Params::new()).unwrap(), "/a");
    }

    #[test]
    fn test_values_are_uri_encoded_by_default() {
        let r = router(vec![Route::new("/q/:term").name("q")], "");
        let urls = UrlGenerator::new(&r, UrlOptions::default());
        assert_eq!(
            urls.url("q", &params([("term", ParamValue::from("a b/c"))])).unwrap(),
            "/q/a%20b%2Fc"
        );
        let raw = UrlGenerator::new(&r, UrlOptions::default().encode(|s: &str| s.to_string()));
        assert_eq!(
            raw.url("q", &params([("term", ParamValue::from("a b"))])).unwrap(),
            "/q/a b"
        );
    }

    #[test]
    fn test_unknown_name() {
        let r = router(vec![Route::new("/a").name("a")], "");
        let urls = UrlGenerator::new(&r, UrlOptions::default());
        assert_eq!(
            urls.url("b", &Params::new()).unwrap_err(),
            RouterError::RouteNameNotFound("b".into())
        );
    }

    #[test]
    fn test_unique_route_name_sep() {
        let r = router(
            vec![Route::new("/admin").name("admin").children([
                Route::new("/users").name("users"),
                Route::new("/group").child(Route::new("/:id").name("member")),
            ])],
            "",
        );
        let urls = UrlGenerator::new(&r, UrlOptions::default().unique_route_name_sep("."));
        assert_eq!(urls.url("admin.users", &Params::new()).unwrap(), "/admin/users");
        assert_eq!(
            urls.url("admin.member", &params([("id", ParamValue::from("3"))])).unwrap(),
            "/admin/group/3"
        );
        assert!(urls.url("users", &Params::new()).is_err());
    }
}
