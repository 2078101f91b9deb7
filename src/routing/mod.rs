//! Routing subsystem: the rewrite-rule engine.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup / reload):
//!     (name, RouteDef)[]
//!     → validation.rs (check kinds, collect errors)
//!     → Freeze as immutable Router (or an empty one, per policy)
//!
//! Per request:
//!     url
//!     → matcher.rs (last matching rewrite across all routes)
//!     → matcher.rs (route skip list)
//!     → resolver.rs (prefix join / `$n` substitution / callback)
//!     → fixup.rs (optional route fix)
//!     → RoutingDecision::Local(path) | NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes validated once, immutable at runtime
//! - Nothing in here aborts a request; failures degrade to NoMatch
//! - Last match wins (declaration order, no ranking)

pub mod fixup;
pub mod matcher;
pub mod resolver;
pub mod router;
pub mod rule;
pub mod validation;

pub use router::{Router, RoutingDecision};
pub use rule::{CallbackError, PathFn, RewriteDef, RouteDef, RouteDefs, RuleValue};
pub use validation::{validate, InvalidRoutePolicy, ValidationError};
