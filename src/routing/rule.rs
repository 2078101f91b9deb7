//! Rewrite rule types.
//!
//! Two layers live here:
//! - the *definition* layer (`RuleValue`, `RewriteDef`, `RouteDef`), a loosely
//!   typed mirror of what a configuration source hands over, which may hold
//!   values of the wrong kind;
//! - the *validated* layer (`Remote`, `Local`, `RewriteEntry`, `Route`), which
//!   is only produced by `routing::validation` and cannot be malformed.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

/// Failure reported by a user-supplied path callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("{0}")]
    Failed(String),

    /// The callback panicked.
    #[error("callback panicked: {0}")]
    Panicked(String),
}

impl CallbackError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

type PathCallback = dyn Fn(&str) -> Result<String, CallbackError> + Send + Sync;

/// A `(String) -> Result<String, CallbackError>` capability.
///
/// Used both for computed local paths and for route fixups.
#[derive(Clone)]
pub struct PathFn(Arc<PathCallback>);

impl PathFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, CallbackError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the callback. Panics are caught and turned into `CallbackError::Panicked`.
    pub fn call(&self, input: &str) -> Result<String, CallbackError> {
        match catch_unwind(AssertUnwindSafe(|| (self.0)(input))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(CallbackError::Panicked(message))
            }
        }
    }
}

impl std::fmt::Debug for PathFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PathFn(..)")
    }
}

/// A configuration value as handed over by a config source.
#[derive(Debug, Clone)]
pub enum RuleValue {
    Text(String),
    Pattern(Regex),
    Function(PathFn),
    List(Vec<RuleValue>),
    Rewrite(RewriteDef),
    /// Anything else, carrying the name of the kind that was found.
    Other(String),
}

impl RuleValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Compile `source` into a pattern value.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self::Pattern)
    }

    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, CallbackError> + Send + Sync + 'static,
    {
        Self::Function(PathFn::new(f))
    }

    pub fn list(items: impl IntoIterator<Item = RuleValue>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Human-readable kind, used in validation messages.
    pub fn kind(&self) -> &str {
        match self {
            RuleValue::Text(_) => "string",
            RuleValue::Pattern(_) => "pattern",
            RuleValue::Function(_) => "function",
            RuleValue::List(_) => "list",
            RuleValue::Rewrite(_) => "table",
            RuleValue::Other(kind) => kind,
        }
    }
}

/// Kind name for an optional value; absent values read as "nothing".
pub(crate) fn kind_of(value: Option<&RuleValue>) -> &str {
    value.map(RuleValue::kind).unwrap_or("nothing")
}

/// One `{ remote, local }` pair as declared.
#[derive(Debug, Clone, Default)]
pub struct RewriteDef {
    pub remote: Option<Box<RuleValue>>,
    pub local: Option<Box<RuleValue>>,
}

impl RewriteDef {
    pub fn new(remote: RuleValue, local: RuleValue) -> Self {
        Self {
            remote: Some(Box::new(remote)),
            local: Some(Box::new(local)),
        }
    }
}

impl From<RewriteDef> for RuleValue {
    fn from(def: RewriteDef) -> Self {
        RuleValue::Rewrite(def)
    }
}

/// A route as declared: `rewrite`, optional `skip`, optional `fix`.
#[derive(Debug, Clone, Default)]
pub struct RouteDef {
    pub rewrite: Option<RuleValue>,
    pub skip: Option<RuleValue>,
    pub fix: Option<RuleValue>,
}

impl RouteDef {
    pub fn new(rewrites: impl IntoIterator<Item = RewriteDef>) -> Self {
        Self {
            rewrite: Some(RuleValue::list(rewrites.into_iter().map(RuleValue::Rewrite))),
            skip: None,
            fix: None,
        }
    }

    pub fn with_skip(mut self, skip: impl IntoIterator<Item = RuleValue>) -> Self {
        self.skip = Some(RuleValue::list(skip));
        self
    }

    pub fn with_fix<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, CallbackError> + Send + Sync + 'static,
    {
        self.fix = Some(RuleValue::function(f));
        self
    }
}

/// Ordered, named route definitions. Declaration order is significant.
pub type RouteDefs = Vec<(String, RouteDef)>;

/// What a URL is matched against: a literal prefix or a pattern.
#[derive(Debug, Clone)]
pub enum Remote {
    Prefix(String),
    Pattern(Regex),
}

/// Where a matched URL maps to: a path/template or a callback.
#[derive(Debug, Clone)]
pub enum Local {
    Template(String),
    Mapper(PathFn),
}

/// A validated rewrite entry.
#[derive(Debug, Clone)]
pub struct RewriteEntry {
    pub remote: Remote,
    pub local: Local,
}

/// A validated route with at least one rewrite entry.
#[derive(Debug, Clone)]
pub struct Route {
    pub name: String,
    pub rewrites: Vec<RewriteEntry>,
    pub skip: Option<Vec<Remote>>,
    pub fix: Option<PathFn>,
}
