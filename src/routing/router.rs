//! Route lookup: URL → local path.
//!
//! # Responsibilities
//! - Validate route definitions once, at construction
//! - Map a remote URL to a local path (match → skip → resolve → fix)
//! - Report every non-fatal problem to the log sink
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - No caching: every call re-evaluates the full chain
//! - Explicit `RoutingDecision::NoMatch` rather than a sentinel path

use std::sync::Arc;

use crate::observability::logging::LogSink;
use crate::routing::fixup::apply_fix;
use crate::routing::matcher::{is_skipped, match_by_remote};
use crate::routing::resolver::{resolve, ResolveError};
use crate::routing::rule::{Route, RouteDef};
use crate::routing::validation::{check_route, CheckedRoute, InvalidRoutePolicy};

/// Result of remapping one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    Local(String),
    NoMatch,
}

impl RoutingDecision {
    pub fn local_path(&self) -> Option<&str> {
        match self {
            RoutingDecision::Local(path) => Some(path),
            RoutingDecision::NoMatch => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, RoutingDecision::Local(_))
    }
}

/// Immutable rule set plus the sink it reports to.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    log: Arc<dyn LogSink>,
}

impl Router {
    /// Build a router with the default `DisableAll` policy.
    pub fn new(defs: &[(String, RouteDef)], log: Arc<dyn LogSink>) -> Self {
        Self::with_policy(defs, InvalidRoutePolicy::default(), log)
    }

    /// Build a router, logging every validation error.
    ///
    /// Under `DisableAll` any error leaves the router with no routes at all.
    pub fn with_policy(
        defs: &[(String, RouteDef)],
        policy: InvalidRoutePolicy,
        log: Arc<dyn LogSink>,
    ) -> Self {
        let checked: Vec<CheckedRoute> = defs
            .iter()
            .map(|(name, def)| check_route(name, def))
            .collect();

        let mut failed = false;
        for error in checked.iter().flat_map(CheckedRoute::errors) {
            log.error(&error.to_string());
            failed = true;
        }

        let routes = match policy {
            InvalidRoutePolicy::DisableAll if failed => {
                log.warning("route configuration is invalid, local overrides are disabled");
                Vec::new()
            }
            _ => checked.into_iter().filter_map(CheckedRoute::into_route).collect(),
        };

        tracing::debug!(routes = routes.len(), ?policy, "Router built");
        Self { routes, log }
    }

    /// A router that never remaps anything.
    pub fn empty(log: Arc<dyn LogSink>) -> Self {
        Self {
            routes: Vec::new(),
            log,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    /// Map `url` to a local path, or `NoMatch`.
    pub fn remap(&self, url: &str) -> RoutingDecision {
        let Some(found) = match_by_remote(url, &self.routes) else {
            return RoutingDecision::NoMatch;
        };

        if let Some(skip) = &found.route.skip {
            if is_skipped(url, skip) {
                return RoutingDecision::NoMatch;
            }
        }

        match resolve(url, found.rewrite) {
            Ok(path) => RoutingDecision::Local(apply_fix(path, found.route, self.log.as_ref())),
            Err(e @ ResolveError::Callback(_)) => {
                self.log.error(&e.to_string());
                RoutingDecision::NoMatch
            }
            Err(_) => RoutingDecision::NoMatch,
        }
    }
}
