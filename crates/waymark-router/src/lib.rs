//! # waymark-router
//!
//! Route trees and middleware-style resolution. Routes are matched in
//! pre-order against a pathname; each matching route's action runs until one
//! produces a value. Ancestor actions can delegate to later routes with
//! [`Context::next`] or only to their own children with
//! [`Context::next_child`], so they work as middleware that captures shared
//! parameters or vetoes a branch.
//!
//! ## Modules
//!
//! - [`route`] - Route definitions and their builder
//! - [`tree`] - The arena route tree
//! - [`matcher`] - Lazy depth-first matching
//! - [`resolver`] - The async [`Router`] and its [`Context`]
//! - [`sync`] - The synchronous [`SyncRouter`]
//! - [`urls`] - URL generation from route names
//! - [`options`] - Router configuration

mod cursor;
pub mod matcher;
pub mod options;
pub mod outcome;
pub mod resolver;
pub mod route;
pub mod sync;
pub mod tree;
pub mod urls;

use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use matcher::{Matcher, RouteMatch};
pub use options::RouterOptions;
pub use outcome::Outcome;
pub use resolver::{action, Action, Context, ErrorHandler, Router};
pub use route::{Route, RoutePath, Routes};
pub use sync::{SyncAction, SyncContext, SyncRouter};
pub use tree::{RouteId, RouteNode, RouteTree};
pub use urls::{QueryHook, RouteOutline, RouteSource, SharedOutline, UrlGenerator, UrlOptions};
