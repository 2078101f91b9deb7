//! Route matching logic.
//!
//! # Responsibilities
//! - Match a URL against a rewrite remote (literal prefix or pattern)
//! - Find the rewrite entry that claims a URL across all routes
//! - Decide whether a URL is excluded by a route's skip list
//!
//! # Design Decisions
//! - Literal remotes match at position 0 only (case-sensitive)
//! - Patterns match anywhere in the URL unless anchored
//! - Last match wins: routes and entries are scanned in declaration order
//!   and every hit replaces the previous one

use crate::routing::rule::{Remote, RewriteEntry, Route};

/// Trait for matching URLs against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the URL matches this condition.
    fn matches(&self, url: &str) -> bool;
}

impl Matcher for Remote {
    fn matches(&self, url: &str) -> bool {
        match self {
            Remote::Prefix(prefix) => url.starts_with(prefix.as_str()),
            Remote::Pattern(regex) => regex.is_match(url),
        }
    }
}

/// A route paired with the entry of it that matched.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub route: &'a Route,
    pub rewrite: &'a RewriteEntry,
}

/// Find the entry claiming `url`, or `None` when nothing matches.
pub fn match_by_remote<'a>(url: &str, routes: &'a [Route]) -> Option<MatchResult<'a>> {
    let mut found = None;
    for route in routes {
        for rewrite in &route.rewrites {
            if rewrite.remote.matches(url) {
                found = Some(MatchResult { route, rewrite });
            }
        }
    }
    found
}

/// True if any skip entry matches `url`.
pub fn is_skipped(url: &str, skip: &[Remote]) -> bool {
    skip.iter().any(|entry| entry.matches(url))
}
