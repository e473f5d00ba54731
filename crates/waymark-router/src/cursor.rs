//! Resolution state shared by every continuation of one `resolve` call.

use tracing::debug;
use waymark_core::RouterResult;

use crate::matcher::{Matcher, RouteMatch};
use crate::tree::{RouteId, RouteTree};

/// What the next continuation step should do.
#[derive(Debug)]
pub(crate) enum Step {
    /// Run this candidate's route.
    Deliver(RouteMatch),
    /// The next candidate lies outside the requested subtree.
    Boundary,
    /// The traversal is finished.
    Exhausted,
}

/// The matcher plus a one-slot lookahead and the last delivered candidate.
#[derive(Debug)]
pub(crate) struct Cursor {
    matcher: Matcher,
    buffered: Option<Option<RouteMatch>>,
    current: Option<RouteMatch>,
}

impl Cursor {
    pub(crate) const fn new(matcher: Matcher) -> Self {
        Self {
            matcher,
            buffered: None,
            current: None,
        }
    }

    /// Returns the most recently delivered candidate.
    pub(crate) const fn current(&self) -> Option<&RouteMatch> {
        self.current.as_ref()
    }

    /// Pulls the next candidate.
    ///
    /// After an explicit miss the last delivered route is skipped. When
    /// `resume` is false, only strict descendants of `parent` are delivered;
    /// anything else is kept for the next call and reported as a boundary.
    pub(crate) fn step<A>(
        &mut self,
        tree: &RouteTree<A>,
        resume: bool,
        parent: Option<RouteId>,
        previous_miss: bool,
    ) -> RouterResult<Step> {
        let skip = if previous_miss {
            self.current.as_ref().map(|m| m.route)
        } else {
            None
        };
        let candidate = match self.buffered.take() {
            Some(buffered) => buffered,
            None => self.matcher.advance(tree, skip)?,
        };

        if !resume {
            let inside = match (&candidate, parent) {
                (Some(candidate), Some(parent)) => tree.is_descendant(candidate.route, parent),
                _ => false,
            };
            if !inside {
                debug!(
                    parent = ?parent,
                    next = ?candidate.as_ref().map(|m| m.route),
                    "stopping at subtree boundary"
                );
                self.buffered = Some(candidate);
                return Ok(Step::Boundary);
            }
        }

        match candidate {
            None => Ok(Step::Exhausted),
            Some(candidate) => {
                debug!(
                    route = %candidate.route,
                    base_url = %candidate.base_url,
                    path = %candidate.path,
                    "delivering candidate"
                );
                self.current = Some(candidate.clone());
                Ok(Step::Deliver(candidate))
            }
        }
    }
}
