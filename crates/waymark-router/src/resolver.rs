//! Asynchronous route resolution.
//!
//! [`Router::resolve`] walks the route tree in pre-order and runs each
//! matching route's action until one produces [`Outcome::Value`]. Actions
//! receive an owned [`Context`] and may hand control to later routes through
//! [`Context::next`] (anywhere in the tree) or [`Context::next_child`] (only
//! their own descendants), which makes ancestor routes usable as middleware.
//!
//! All continuations of one resolution share a single cursor. The engine only
//! suspends inside action futures, and the cursor lock is never held across
//! an `.await`.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, Instrument};
use waymark_core::logging::resolve_span;
use waymark_core::{RouterError, RouterResult};
use waymark_pattern::Params;

use crate::cursor::{Cursor, Step};
use crate::matcher::{Matcher, RouteMatch};
use crate::options::RouterOptions;
use crate::outcome::Outcome;
use crate::route::{Route, Routes};
use crate::tree::{RouteId, RouteNode, RouteTree};
use crate::urls::{RouteOutline, SharedOutline};
use crate::BoxFuture;

/// A route action. Also the signature of a custom `resolve_route` hook.
pub type Action<C, R> =
    Arc<dyn Fn(Context<C, R>) -> BoxFuture<'static, RouterResult<Outcome<R>>> + Send + Sync>;

/// Converts a resolution error into a result.
pub type ErrorHandler<C, R> =
    Arc<dyn Fn(RouterError, Context<C, R>) -> BoxFuture<'static, RouterResult<R>> + Send + Sync>;

/// Wraps an async closure as an [`Action`].
///
/// # Examples
///
/// ```
/// use waymark_router::{action, Outcome, Route};
///
/// let route = Route::new("/ping").action(action(|_ctx: waymark_router::Context<(), &str>| async {
///     Ok(Outcome::Value("pong"))
/// }));
/// # let _ = route;
/// ```
pub fn action<C, R, F, Fut>(f: F) -> Action<C, R>
where
    C: 'static,
    R: 'static,
    F: Fn(Context<C, R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = RouterResult<Outcome<R>>> + Send + 'static,
{
    Arc::new(move |ctx: Context<C, R>| -> BoxFuture<'static, RouterResult<Outcome<R>>> {
        Box::pin(f(ctx))
    })
}

/// Runs the route's own action, or reports [`Outcome::Absent`] when it has none.
fn call_action<C, R>(ctx: Context<C, R>) -> BoxFuture<'static, RouterResult<Outcome<R>>>
where
    C: 'static,
    R: Send + 'static,
{
    match ctx.action() {
        Some(action) => action(ctx),
        None => Box::pin(async { Ok(Outcome::Absent) }),
    }
}

/// Per-resolution state shared by every [`Context`] of one `resolve` call.
struct Resolution<C, R> {
    pathname: String,
    base_url: String,
    data: C,
    tree: Arc<RouteTree<Action<C, R>>>,
    resolve_route: Action<C, R>,
    cursor: Mutex<Cursor>,
}

impl<C, R> Resolution<C, R> {
    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C, R> Resolution<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Builds the context for a candidate, or the seed context when there is none.
    fn context(self: &Arc<Self>, candidate: Option<RouteMatch>) -> Context<C, R> {
        let (route, base_url, path, params) = match candidate {
            Some(m) => (Some(m.route), m.base_url, m.path, m.params),
            None => (None, self.base_url.clone(), String::new(), Params::new()),
        };
        Context {
            pathname: self.pathname.clone(),
            base_url,
            path,
            params,
            route,
            data: self.data.clone(),
            resolution: Arc::clone(self),
        }
    }

    async fn run(
        self: Arc<Self>,
        resume: bool,
        parent: Option<RouteId>,
        mut previous_miss: bool,
    ) -> RouterResult<Outcome<R>> {
        loop {
            let step = self.lock().step(&*self.tree, resume, parent, previous_miss)?;
            let candidate = match step {
                Step::Deliver(candidate) => candidate,
                Step::Boundary => return Ok(Outcome::Absent),
                Step::Exhausted => return Err(RouterError::not_found(&self.pathname)),
            };
            let ctx = self.context(Some(candidate));
            match (self.resolve_route)(ctx).await? {
                Outcome::Value(value) => return Ok(Outcome::Value(value)),
                Outcome::Miss => previous_miss = true,
                Outcome::Absent => previous_miss = false,
            }
        }
    }
}

/// What an action sees: the pathname, the current match, caller data, and
/// the continuations.
pub struct Context<C, R> {
    /// The full pathname being resolved.
    pub pathname: String,
    /// Everything consumed before the current route.
    pub base_url: String,
    /// The part consumed by the current route.
    pub path: String,
    /// Parameters captured by the current route and its ancestors.
    pub params: Params,
    /// The current route. `None` only in the context given to an error
    /// handler when nothing matched.
    pub route: Option<RouteId>,
    /// Caller data.
    pub data: C,
    resolution: Arc<Resolution<C, R>>,
}

impl<C: Clone, R> Clone for Context<C, R> {
    fn clone(&self) -> Self {
        Self {
            pathname: self.pathname.clone(),
            base_url: self.base_url.clone(),
            path: self.path.clone(),
            params: self.params.clone(),
            route: self.route,
            data: self.data.clone(),
            resolution: Arc::clone(&self.resolution),
        }
    }
}

impl<C: fmt::Debug, R> fmt::Debug for Context<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("pathname", &self.pathname)
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("route", &self.route)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl<C, R> Context<C, R> {
    /// Returns the route tree.
    pub fn tree(&self) -> &RouteTree<Action<C, R>> {
        &self.resolution.tree
    }

    /// Returns the current route node.
    pub fn route_node(&self) -> Option<&RouteNode<Action<C, R>>> {
        self.route.and_then(|id| self.resolution.tree.get(id))
    }

    /// Returns the current route's name.
    pub fn route_name(&self) -> Option<&str> {
        self.route_node().and_then(RouteNode::name)
    }

    /// Returns a metadata value of the current route.
    pub fn meta(&self, key: &str) -> Option<&serde_json::Value> {
        self.route_node().and_then(|node| node.meta_value(key))
    }

    /// Returns the current route's action.
    pub fn action(&self) -> Option<Action<C, R>> {
        self.route_node().and_then(|node| node.action().cloned())
    }
}

impl<C, R> Context<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Continues with the next matching route anywhere in the tree.
    pub async fn next(&self) -> RouterResult<Outcome<R>> {
        let parent = self.resolution.lock().current().map(|m| m.route);
        self.next_with(true, parent).await
    }

    /// Continues only into descendants of the current route.
    ///
    /// Returns [`Outcome::Absent`] when the next match lies outside them; that
    /// match is kept and delivered to whoever continues next.
    pub async fn next_child(&self) -> RouterResult<Outcome<R>> {
        self.next_with(false, self.route).await
    }

    /// The general continuation.
    ///
    /// With `resume` the next match is taken wherever it is; without it only
    /// strict descendants of `parent` are delivered.
    pub async fn next_with(
        &self,
        resume: bool,
        parent: Option<RouteId>,
    ) -> RouterResult<Outcome<R>> {
        Arc::clone(&self.resolution).run(resume, parent, false).await
    }
}

/// An asynchronous router over a route tree.
///
/// `C` is the caller data carried in every [`Context`]; `R` is the result
/// type actions produce.
///
/// # Examples
///
/// ```
/// use waymark_router::{action, Context, Outcome, Route, Router, RouterOptions};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let router: Router<(), String> = Router::new(
///     vec![Route::new("/hello/:name").action(action(|ctx: Context<(), String>| async move {
///         let name = ctx.params["name"].as_str().unwrap_or_default().to_string();
///         Ok(Outcome::Value(format!("Hello, {name}")))
///     }))],
///     RouterOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(router.resolve("/hello/world").await.unwrap(), "Hello, world");
/// # });
/// ```
pub struct Router<C, R> {
    tree: Arc<RouteTree<Action<C, R>>>,
    outline: SharedOutline,
    base_url: String,
    data: C,
    resolve_route: Action<C, R>,
    error_handler: Option<ErrorHandler<C, R>>,
}

impl<C: Clone, R> Clone for Router<C, R> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            outline: self.outline.detach(),
            base_url: self.base_url.clone(),
            data: self.data.clone(),
            resolve_route: Arc::clone(&self.resolve_route),
            error_handler: self.error_handler.clone(),
        }
    }
}

impl<C: fmt::Debug, R> fmt::Debug for Router<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("base_url", &self.base_url)
            .field("data", &self.data)
            .field("tree", &self.tree)
            .field("error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<C, R> Router<C, R>
where
    C: Clone + Send + Sync + 'static,
    R: Send + 'static,
{
    /// Builds a router from route definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRoutes`] if the root route is unusable.
    pub fn new(
        routes: impl Into<Routes<Action<C, R>>>,
        options: RouterOptions<C>,
    ) -> RouterResult<Self> {
        let tree = RouteTree::new(routes.into(), options.pattern)?;
        Ok(Self {
            outline: SharedOutline::new(RouteOutline::from_tree(&tree, &options.base_url)),
            tree: Arc::new(tree),
            base_url: options.base_url,
            data: options.context,
            resolve_route: Arc::new(call_action::<C, R>),
            error_handler: None,
        })
    }

    /// Replaces the hook that runs a matched route.
    ///
    /// The default runs the route's action and reports [`Outcome::Absent`]
    /// for routes without one.
    #[must_use]
    pub fn with_resolve_route<F, Fut>(mut self, resolve_route: F) -> Self
    where
        F: Fn(Context<C, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RouterResult<Outcome<R>>> + Send + 'static,
    {
        self.resolve_route = action(resolve_route);
        self
    }

    /// Installs an error handler.
    ///
    /// The handler receives every error that would end a resolution,
    /// including [`RouterError::RouteNotFound`], together with the context of
    /// the last route that ran. Its result becomes the resolution's result.
    #[must_use]
    pub fn with_error_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(RouterError, Context<C, R>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RouterResult<R>> + Send + 'static,
    {
        self.error_handler = Some(Arc::new(
            move |error: RouterError, ctx: Context<C, R>| -> BoxFuture<'static, RouterResult<R>> {
                Box::pin(handler(error, ctx))
            },
        ));
        self
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the default caller data.
    pub const fn data(&self) -> &C {
        &self.data
    }

    /// Returns the route tree.
    pub fn tree(&self) -> &RouteTree<Action<C, R>> {
        &self.tree
    }

    /// Appends a route under `parent`.
    ///
    /// The tree is copied on write, so resolutions already in flight keep
    /// seeing the tree as it was when they started. URL generators built from
    /// this router pick the route up on their next name lookup miss.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRoutes`] if `parent` is unknown.
    pub fn add_route(
        &mut self,
        parent: RouteId,
        route: Route<Action<C, R>>,
    ) -> RouterResult<RouteId> {
        let id = Arc::make_mut(&mut self.tree).add_route(parent, route)?;
        self.outline.replace(RouteOutline::from_tree(&self.tree, &self.base_url));
        Ok(id)
    }

    pub(crate) const fn outline(&self) -> &SharedOutline {
        &self.outline
    }

    /// Resolves `pathname` with the router's default data.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RouteNotFound`] if no action produced a value,
    /// or whatever error an action raised, unless an error handler is set.
    pub async fn resolve(&self, pathname: &str) -> RouterResult<R> {
        self.resolve_with(pathname, self.data.clone()).await
    }

    /// Resolves `pathname` with caller-supplied data.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub async fn resolve_with(&self, pathname: &str, data: C) -> RouterResult<R> {
        self.run_resolution(pathname, data)
            .instrument(resolve_span(pathname))
            .await
    }

    async fn run_resolution(&self, pathname: &str, data: C) -> RouterResult<R> {
        let remaining = pathname.strip_prefix(self.base_url.as_str());
        let resolution = Arc::new(Resolution {
            pathname: pathname.to_string(),
            base_url: self.base_url.clone(),
            data,
            tree: Arc::clone(&self.tree),
            resolve_route: Arc::clone(&self.resolve_route),
            cursor: Mutex::new(Cursor::new(Matcher::new(
                self.base_url.clone(),
                remaining.unwrap_or_default(),
            ))),
        });

        let result = if remaining.is_some() {
            Arc::clone(&resolution)
                .run(true, Some(self.tree.root()), false)
                .await
                .and_then(|outcome| {
                    outcome
                        .into_value()
                        .ok_or_else(|| RouterError::not_found(pathname))
                })
        } else {
            debug!(base_url = %self.base_url, "pathname is outside the base url");
            Err(RouterError::not_found(pathname))
        };

        match (result, &self.error_handler) {
            (Err(error), Some(handler)) => {
                debug!(error = %error, "passing error to the error handler");
                let current = resolution.lock().current().cloned();
                handler(error, resolution.context(current)).await
            }
            (result, _) => result,
        }
    }
}
