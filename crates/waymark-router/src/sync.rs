//! Synchronous route resolution.
//!
//! [`SyncRouter`] runs the same traversal as [`Router`](crate::Router) but
//! actions return their outcome directly. Contexts are single-threaded
//! (`Rc`), so actions may capture non-`Send` state.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use tracing::debug;
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

/// A synchronous route action. Also the signature of a custom `resolve_route` hook.
pub type SyncAction<C, R> = Rc<dyn Fn(SyncContext<C, R>) -> RouterResult<Outcome<R>>>;

/// Converts a resolution error into a result.
pub type SyncErrorHandler<C, R> = Rc<dyn Fn(RouterError, SyncContext<C, R>) -> RouterResult<R>>;

/// Wraps a closure as a [`SyncAction`].
pub fn action<C, R, F>(f: F) -> SyncAction<C, R>
where
    F: Fn(SyncContext<C, R>) -> RouterResult<Outcome<R>> + 'static,
{
    Rc::new(f)
}

fn call_action<C, R>(ctx: SyncContext<C, R>) -> RouterResult<Outcome<R>> {
    match ctx.action() {
        Some(action) => action(ctx),
        None => Ok(Outcome::Absent),
    }
}

struct Resolution<C, R> {
    pathname: String,
    base_url: String,
    data: C,
    tree: Rc<RouteTree<SyncAction<C, R>>>,
    resolve_route: SyncAction<C, R>,
    cursor: RefCell<Cursor>,
}

impl<C: Clone, R> Resolution<C, R> {
    fn cursor(&self) -> RefMut<'_, Cursor> {
        self.cursor.borrow_mut()
    }

    fn context(self: &Rc<Self>, candidate: Option<RouteMatch>) -> SyncContext<C, R> {
        let (route, base_url, path, params) = match candidate {
            Some(m) => (Some(m.route), m.base_url, m.path, m.params),
            None => (None, self.base_url.clone(), String::new(), Params::new()),
        };
        SyncContext {
            pathname: self.pathname.clone(),
            base_url,
            path,
            params,
            route,
            data: self.data.clone(),
            resolution: Rc::clone(self),
        }
    }

    fn run(
        self: &Rc<Self>,
        resume: bool,
        parent: Option<RouteId>,
        mut previous_miss: bool,
    ) -> RouterResult<Outcome<R>> {
        loop {
            let step = self.cursor().step(&*self.tree, resume, parent, previous_miss)?;
            let candidate = match step {
                Step::Deliver(candidate) => candidate,
                Step::Boundary => return Ok(Outcome::Absent),
                Step::Exhausted => return Err(RouterError::not_found(&self.pathname)),
            };
            match (self.resolve_route)(self.context(Some(candidate)))? {
                Outcome::Value(value) => return Ok(Outcome::Value(value)),
                Outcome::Miss => previous_miss = true,
                Outcome::Absent => previous_miss = false,
            }
        }
    }
}

/// What a synchronous action sees. Mirrors [`Context`](crate::Context).
pub struct SyncContext<C, R> {
    /// The full pathname being resolved.
    pub pathname: String,
    /// Everything consumed before the current route.
    pub base_url: String,
    /// The part consumed by the current route.
    pub path: String,
    /// Parameters captured by the current route and its ancestors.
    pub params: Params,
    /// The current route.
    pub route: Option<RouteId>,
    /// Caller data.
    pub data: C,
    resolution: Rc<Resolution<C, R>>,
}

impl<C: Clone, R> Clone for SyncContext<C, R> {
    fn clone(&self) -> Self {
        Self {
            pathname: self.pathname.clone(),
            base_url: self.base_url.clone(),
            path: self.path.clone(),
            params: self.params.clone(),
            route: self.route,
            data: self.data.clone(),
            resolution: Rc::clone(&self.resolution),
        }
    }
}

impl<C: fmt::Debug, R> fmt::Debug for SyncContext<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("pathname", &self.pathname)
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("route", &self.route)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

impl<C, R> SyncContext<C, R> {
    /// Returns the route tree.
    pub fn tree(&self) -> &RouteTree<SyncAction<C, R>> {
        &self.resolution.tree
    }

    /// Returns the current route node.
    pub fn route_node(&self) -> Option<&RouteNode<SyncAction<C, R>>> {
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
    pub fn action(&self) -> Option<SyncAction<C, R>> {
        self.route_node().and_then(|node| node.action().cloned())
    }
}

impl<C: Clone, R> SyncContext<C, R> {
    /// Continues with the next matching route anywhere in the tree.
    pub fn next(&self) -> RouterResult<Outcome<R>> {
        let parent = self.resolution.cursor().current().map(|m| m.route);
        self.next_with(true, parent)
    }

    /// Continues only into descendants of the current route.
    pub fn next_child(&self) -> RouterResult<Outcome<R>> {
        self.next_with(false, self.route)
    }

    /// The general continuation. See [`Context::next_with`](crate::Context::next_with).
    pub fn next_with(&self, resume: bool, parent: Option<RouteId>) -> RouterResult<Outcome<R>> {
        self.resolution.run(resume, parent, false)
    }
}

/// A synchronous router over a route tree.
///
/// # Examples
///
/// ```
/// use waymark_router::sync::{action, SyncContext, SyncRouter};
/// use waymark_router::{Outcome, Route, RouterOptions};
///
/// let router: SyncRouter<(), u32> = SyncRouter::new(
///     vec![Route::new("/answer")
///         .action(action(|_: SyncContext<(), u32>| Ok(Outcome::Value(42))))],
///     RouterOptions::default(),
/// )
/// .unwrap();
/// assert_eq!(router.resolve("/answer").unwrap(), 42);
/// ```
pub struct SyncRouter<C, R> {
    tree: Rc<RouteTree<SyncAction<C, R>>>,
    outline: SharedOutline,
    base_url: String,
    data: C,
    resolve_route: SyncAction<C, R>,
    error_handler: Option<SyncErrorHandler<C, R>>,
}

impl<C: Clone, R> Clone for SyncRouter<C, R> {
    fn clone(&self) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            outline: self.outline.detach(),
            base_url: self.base_url.clone(),
            data: self.data.clone(),
            resolve_route: Rc::clone(&self.resolve_route),
            error_handler: self.error_handler.clone(),
        }
    }
}

impl<C: fmt::Debug, R> fmt::Debug for SyncRouter<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRouter")
            .field("base_url", &self.base_url)
            .field("data", &self.data)
            .field("tree", &self.tree)
            .field("error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl<C, R> SyncRouter<C, R>
where
    C: Clone + 'static,
    R: 'static,
{
    /// Builds a router from route definitions.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRoutes`] if the root route is unusable.
    pub fn new(
        routes: impl Into<Routes<SyncAction<C, R>>>,
        options: RouterOptions<C>,
    ) -> RouterResult<Self> {
        let tree = RouteTree::new(routes.into(), options.pattern)?;
        Ok(Self {
            outline: SharedOutline::new(RouteOutline::from_tree(&tree, &options.base_url)),
            tree: Rc::new(tree),
            base_url: options.base_url,
            data: options.context,
            resolve_route: Rc::new(call_action::<C, R>),
            error_handler: None,
        })
    }

    /// Replaces the hook that runs a matched route.
    #[must_use]
    pub fn with_resolve_route<F>(mut self, resolve_route: F) -> Self
    where
        F: Fn(SyncContext<C, R>) -> RouterResult<Outcome<R>> + 'static,
    {
        self.resolve_route = Rc::new(resolve_route);
        self
    }

    /// Installs an error handler.
    ///
    /// See [`Router::with_error_handler`](crate::Router::with_error_handler).
    #[must_use]
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(RouterError, SyncContext<C, R>) -> RouterResult<R> + 'static,
    {
        self.error_handler = Some(Rc::new(handler));
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
    pub fn tree(&self) -> &RouteTree<SyncAction<C, R>> {
        &self.tree
    }

    /// Appends a route under `parent`, copying the tree on write.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRoutes`] if `parent` is unknown.
    pub fn add_route(
        &mut self,
        parent: RouteId,
        route: Route<SyncAction<C, R>>,
    ) -> RouterResult<RouteId> {
        let id = Rc::make_mut(&mut self.tree).add_route(parent, route)?;
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
    pub fn resolve(&self, pathname: &str) -> RouterResult<R> {
        self.resolve_with(pathname, self.data.clone())
    }

    /// Resolves `pathname` with caller-supplied data.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve).
    pub fn resolve_with(&self, pathname: &str, data: C) -> RouterResult<R> {
        let span = resolve_span(pathname);
        let _guard = span.enter();

        let remaining = pathname.strip_prefix(self.base_url.as_str());
        let resolution = Rc::new(Resolution {
            pathname: pathname.to_string(),
            base_url: self.base_url.clone(),
            data,
            tree: Rc::clone(&self.tree),
            resolve_route: Rc::clone(&self.resolve_route),
            cursor: RefCell::new(Cursor::new(Matcher::new(
                self.base_url.clone(),
                remaining.unwrap_or_default(),
            ))),
        });

        let result = if remaining.is_some() {
            resolution
                .run(true, Some(self.tree.root()), false)
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
                let current = resolution.cursor().current().cloned();
                handler(error, resolution.context(current))
            }
            (result, _) => result,
        }
    }
}
