//! The arena route tree.
//!
//! Route definitions are flattened into a vector of [`RouteNode`]s addressed
//! by [`RouteId`]. Parent indices are assigned when a node is inserted, so
//! ancestry checks never depend on traversal order. Each node lazily compiles
//! and caches its path matcher on first use.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use tracing::trace;
use waymark_core::{RouterError, RouterResult};
use waymark_pattern::{decode_component, MatchFunction, PatternOptions};

use crate::route::{Route, RoutePath, Routes};

/// Index of a node in a [`RouteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(usize);

impl RouteId {
    /// Returns the arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the route tree.
#[derive(Clone)]
pub struct RouteNode<A> {
    path: RoutePath,
    name: Option<String>,
    action: Option<A>,
    children: Vec<RouteId>,
    parent: Option<RouteId>,
    meta: HashMap<String, serde_json::Value>,
    compiled: OnceLock<MatchFunction>,
}

impl<A> fmt::Debug for RouteNode<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("action", &self.action.is_some())
            .field("children", &self.children)
            .field("parent", &self.parent)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

impl<A> RouteNode<A> {
    /// Returns the path.
    pub const fn path(&self) -> &RoutePath {
        &self.path
    }

    /// Returns the name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the action, if any.
    pub const fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }

    /// Returns the children in declaration order.
    pub fn children(&self) -> &[RouteId] {
        &self.children
    }

    /// Returns the parent, or `None` for the root.
    pub const fn parent(&self) -> Option<RouteId> {
        self.parent
    }

    /// Returns all metadata.
    pub const fn meta(&self) -> &HashMap<String, serde_json::Value> {
        &self.meta
    }

    /// Returns one metadata value.
    pub fn meta_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.meta.get(key)
    }

    /// Returns `true` if the node has no children. Leaf patterns are end-anchored.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An arena of route nodes with a single root.
#[derive(Clone)]
pub struct RouteTree<A> {
    nodes: Vec<RouteNode<A>>,
    root: RouteId,
    options: PatternOptions,
}

impl<A> fmt::Debug for RouteTree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTree")
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .field("options", &self.options)
            .finish()
    }
}

impl<A> RouteTree<A> {
    /// Builds a tree from route definitions.
    ///
    /// Captured values are percent-decoded with
    /// [`decode_component`] unless `options` carries its own decoder.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRoutes`] if the root path is an empty
    /// list of alternatives.
    pub fn new(routes: Routes<A>, mut options: PatternOptions) -> RouterResult<Self> {
        let root = routes.into_root();
        if matches!(&root.path, RoutePath::Alternatives(paths) if paths.is_empty()) {
            return Err(RouterError::InvalidRoutes(
                "the root route has an empty list of paths".into(),
            ));
        }
        if options.decode.is_none() {
            options = options.decode(decode_component);
        }
        let mut tree = Self {
            nodes: Vec::new(),
            root: RouteId(0),
            options,
        };
        tree.root = tree.insert(root, None);
        Ok(tree)
    }

    fn insert(&mut self, route: Route<A>, parent: Option<RouteId>) -> RouteId {
        let id = RouteId(self.nodes.len());
        self.nodes.push(RouteNode {
            path: route.path,
            name: route.name,
            action: route.action,
            children: Vec::with_capacity(route.children.len()),
            parent,
            meta: route.meta,
            compiled: OnceLock::new(),
        });
        for child in route.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// Appends `route` and its descendants as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidRoutes`] if `parent` is not in this tree.
    pub fn add_route(&mut self, parent: RouteId, route: Route<A>) -> RouterResult<RouteId> {
        let Some(node) = self.nodes.get_mut(parent.0) else {
            return Err(RouterError::InvalidRoutes(format!(
                "parent route {parent} does not exist"
            )));
        };
        // The parent may have been a leaf, which changes how it is anchored.
        node.compiled = OnceLock::new();
        let id = self.insert(route, Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Returns the root id.
    pub const fn root(&self) -> RouteId {
        self.root
    }

    /// Returns a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another tree and is out of range.
    pub fn node(&self, id: RouteId) -> &RouteNode<A> {
        &self.nodes[id.0]
    }

    /// Returns a node, or `None` if `id` is out of range.
    pub fn get(&self, id: RouteId) -> Option<&RouteNode<A>> {
        self.nodes.get(id.0)
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes. A built tree always has a root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the options used to compile node patterns.
    pub const fn options(&self) -> &PatternOptions {
        &self.options
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    pub fn is_descendant(&self, node: RouteId, ancestor: RouteId) -> bool {
        let mut current = self.get(node).and_then(RouteNode::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(RouteNode::parent);
        }
        false
    }

    /// Iterates from `id` up to the root, starting with `id` itself.
    pub fn ancestors(&self, id: RouteId) -> impl Iterator<Item = RouteId> + '_ {
        std::iter::successors(Some(id), |&current| self.get(current).and_then(RouteNode::parent))
    }

    /// Iterates node ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = RouteId> {
        (0..self.nodes.len()).map(RouteId)
    }

    /// Finds the first route with `name` in pre-order.
    pub fn find(&self, name: &str) -> Option<RouteId> {
        self.iter().find(|&id| self.node(id).name() == Some(name))
    }

    /// Iterates node ids in pre-order: each node before its children,
    /// children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = RouteId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.node(id).children.iter().rev());
            Some(id)
        })
    }

    /// Returns the node's matcher, compiling it on first use.
    ///
    /// Leaves are compiled with the configured `end`, inner nodes always
    /// as prefix matchers.
    pub(crate) fn compiled(&self, id: RouteId) -> RouterResult<&MatchFunction> {
        let node = self.node(id);
        if let Some(matcher) = node.compiled.get() {
            return Ok(matcher);
        }
        let options = if node.is_leaf() {
            self.options.clone()
        } else {
            self.options.clone().end(false)
        };
        let matcher = MatchFunction::new(node.path.as_input(), &options)?;
        trace!(route = %id, regex = matcher.regex().as_str(), "compiled route pattern");
        Ok(node.compiled.get_or_init(|| matcher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RouteTree<()> {
        let routes: Routes<()> = vec![
            Route::new("/a").name("a").child(Route::new("/b").name("b")),
            Route::new("/c").name("c"),
        ]
        .into();
        RouteTree::new(routes, PatternOptions::default()).unwrap()
    }

    fn named(tree: &RouteTree<()>, name: &str) -> RouteId {
        tree.iter()
            .find(|&id| tree.node(id).name() == Some(name))
            .unwrap()
    }

    #[test]
    fn test_parents_assigned_eagerly() {
        let tree = sample();
        let b = named(&tree, "b");
        let a = named(&tree, "a");
        assert_eq!(tree.node(b).parent(), Some(a));
        assert_eq!(tree.node(a).parent(), Some(tree.root()));
        assert_eq!(tree.node(tree.root()).parent(), None);
    }

    #[test]
    fn test_pre_order_iteration() {
        let tree = sample();
        let names: Vec<Option<&str>> = tree.iter().map(|id| tree.node(id).name()).collect();
        assert_eq!(names, vec![None, Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn test_is_descendant() {
        let tree = sample();
        let (a, b, c) = (named(&tree, "a"), named(&tree, "b"), named(&tree, "c"));
        assert!(tree.is_descendant(b, a));
        assert!(tree.is_descendant(b, tree.root()));
        assert!(!tree.is_descendant(a, a));
        assert!(!tree.is_descendant(c, a));
    }

    #[test]
    fn test_ancestors() {
        let tree = sample();
        let b = named(&tree, "b");
        let chain: Vec<RouteId> = tree.ancestors(b).collect();
        assert_eq!(chain, vec![b, named(&tree, "a"), tree.root()]);
    }

    #[test]
    fn test_empty_alternatives_root_rejected() {
        let routes: Routes<()> = Route::new(Vec::<String>::new()).into();
        assert!(matches!(
            RouteTree::new(routes, PatternOptions::default()),
            Err(RouterError::InvalidRoutes(_))
        ));
    }

    #[test]
    fn test_compiled_anchoring_depends_on_children() {
        let tree = sample();
        let a = tree.compiled(named(&tree, "a")).unwrap();
        assert!(a.matches("/a/b").unwrap().is_some());
        let c = tree.compiled(named(&tree, "c")).unwrap();
        assert!(c.matches("/c/d").unwrap().is_none());
    }

    #[test]
    fn test_add_route_resets_parent_pattern() {
        let mut tree = sample();
        let c = named(&tree, "c");
        assert!(tree.compiled(c).unwrap().matches("/c/d").unwrap().is_none());
        let d = tree.add_route(c, Route::new("/d").name("d")).unwrap();
        assert_eq!(tree.node(d).parent(), Some(c));
        assert!(tree.compiled(c).unwrap().matches("/c/d").unwrap().is_some());
    }

    #[test]
    fn test_add_route_unknown_parent() {
        let mut tree = sample();
        let err = tree.add_route(RouteId(99), Route::new("/x")).unwrap_err();
        assert!(matches!(err, RouterError::InvalidRoutes(_)));
    }
}
