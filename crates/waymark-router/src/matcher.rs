//! Depth-first route matching.
//!
//! [`Matcher`] walks a [`RouteTree`] against one pathname and yields a
//! [`RouteMatch`] for every node whose pattern matches, in pre-order. It keeps
//! one [`Frame`] per matched inner node on an explicit stack; a frame records
//! where its children should continue matching and which child comes next.
//! A node that does not match yields nothing and its children are never tried.

use tracing::debug;
use waymark_core::RouterResult;
use waymark_pattern::Params;

use crate::tree::{RouteId, RouteTree};

/// A route that matched, with the path state at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The matched node.
    pub route: RouteId,
    /// Everything consumed before this node.
    pub base_url: String,
    /// The part consumed by this node.
    pub path: String,
    /// Ancestor params overlaid with this node's captures.
    pub params: Params,
}

#[derive(Debug)]
struct Frame {
    route: RouteId,
    base_url: String,
    remaining: String,
    params: Params,
    next_child: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Done,
}

/// Lazy pre-order traversal of the nodes matching a pathname.
///
/// The matcher does not own the tree; every [`advance`](Self::advance) call
/// takes it by reference and must be given the same tree.
#[derive(Debug)]
pub struct Matcher {
    base_url: String,
    pathname: String,
    stack: Vec<Frame>,
    state: State,
}

impl Matcher {
    /// Creates a matcher for `pathname`, which must already have `base_url` removed.
    pub fn new(base_url: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pathname: pathname.into(),
            stack: Vec::new(),
            state: State::Fresh,
        }
    }

    /// Returns `true` once the traversal has finished.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Produces the next match, or `None` when the traversal is finished.
    ///
    /// When `skip` is given, that route and everything below it are abandoned:
    /// a frame for it on the active chain is dropped along with its
    /// descendants, and if it is about to be entered it is treated as not
    /// matching without evaluating its pattern.
    ///
    /// # Errors
    ///
    /// Returns any error raised while compiling or running a node pattern.
    pub fn advance<A>(
        &mut self,
        tree: &RouteTree<A>,
        skip: Option<RouteId>,
    ) -> RouterResult<Option<RouteMatch>> {
        match self.state {
            State::Done => return Ok(None),
            State::Fresh => {
                self.state = State::Running;
                let base_url = self.base_url.clone();
                let pathname = self.pathname.clone();
                let root = tree.root();
                let found = self.enter(tree, root, &base_url, &pathname, &Params::new(), skip)?;
                if found.is_none() {
                    self.state = State::Done;
                }
                return Ok(found);
            }
            State::Running => {}
        }

        if let Some(skip) = skip {
            if let Some(pos) = self.stack.iter().position(|frame| frame.route == skip) {
                debug!(route = %skip, dropped = self.stack.len() - pos, "skipping subtree");
                self.stack.truncate(pos);
            }
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.state = State::Done;
                return Ok(None);
            };
            let Some(&child) = tree.node(frame.route).children().get(frame.next_child) else {
                self.stack.pop();
                continue;
            };
            frame.next_child += 1;
            let base_url = frame.base_url.clone();
            let remaining = frame.remaining.clone();
            let params = frame.params.clone();
            if let Some(found) = self.enter(tree, child, &base_url, &remaining, &params, skip)? {
                return Ok(Some(found));
            }
        }
    }

    /// Tries to match `route` against `pathname`, pushing a frame for its
    /// children on success.
    fn enter<A>(
        &mut self,
        tree: &RouteTree<A>,
        route: RouteId,
        base_url: &str,
        pathname: &str,
        parent_params: &Params,
        skip: Option<RouteId>,
    ) -> RouterResult<Option<RouteMatch>> {
        if skip == Some(route) {
            debug!(route = %route, "skipping route before entering it");
            return Ok(None);
        }
        let Some(matched) = tree.compiled(route)?.matches(pathname)? else {
            return Ok(None);
        };

        let node = tree.node(route);
        let mut path = matched.path;
        if !node.is_leaf() && path.ends_with('/') {
            path.pop();
        }
        let mut params = parent_params.clone();
        params.extend(matched.params);

        if !node.is_leaf() {
            self.stack.push(Frame {
                route,
                base_url: format!("{base_url}{path}"),
                remaining: pathname.get(path.len()..).unwrap_or_default().to_string(),
                params: params.clone(),
                next_child: 0,
            });
        }

        Ok(Some(RouteMatch {
            route,
            base_url: base_url.to_string(),
            path,
            params,
        }))
    }
}
