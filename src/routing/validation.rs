//! Route validation.
//!
//! # Responsibilities
//! - Check each declared route: rewrites, remotes, locals, fix, skip
//! - Turn well-formed definitions into validated `Route`s
//! - Collect every error instead of stopping at the first
//!
//! # Design Decisions
//! - Validation never panics and never mutates its input
//! - Invalid entries are excluded; a route with no valid entry left is invalid
//! - What happens to the rule set as a whole is decided by `InvalidRoutePolicy`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::rule::{
    kind_of, Local, PathFn, Remote, RewriteDef, RewriteEntry, Route, RouteDef, RuleValue,
};

/// A problem found in a route definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{route} route has no rewrite rules")]
    NoRewrites { route: String },

    #[error("{route} route has invalid rewrite entry (expected table, but {found} given)")]
    InvalidEntry { route: String, found: String },

    #[error("{route} route has invalid rewrite.remote entry (expected string or pattern, but {found} given)")]
    InvalidRemote { route: String, found: String },

    #[error("{route} route has invalid rewrite.local entry (expected string or function, but {found} given)")]
    InvalidLocal { route: String, found: String },

    #[error("{route} route has invalid fix function ({found} given)")]
    InvalidFix { route: String, found: String },

    #[error("{route} route has invalid skip array ({found} given)")]
    InvalidSkip { route: String, found: String },

    #[error("{route} route has invalid skip entry (expected string or pattern, but {found} given)")]
    InvalidSkipEntry { route: String, found: String },
}

/// How the router treats a rule set that produced validation errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidRoutePolicy {
    /// Any error disables every route; the proxy becomes pure pass-through.
    #[default]
    DisableAll,
    /// Only the broken parts are dropped; the rest keeps working.
    DropRoute,
}

/// Outcome of checking a single route.
#[derive(Debug, Clone)]
pub enum CheckedRoute {
    /// Fully valid.
    Valid(Route),
    /// Usable, but some rewrite entries were excluded.
    Degraded(Route, Vec<ValidationError>),
    /// Not usable at all.
    Invalid(Vec<ValidationError>),
}

impl CheckedRoute {
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            CheckedRoute::Valid(_) => &[],
            CheckedRoute::Degraded(_, errors) | CheckedRoute::Invalid(errors) => errors,
        }
    }

    pub fn into_route(self) -> Option<Route> {
        match self {
            CheckedRoute::Valid(route) | CheckedRoute::Degraded(route, _) => Some(route),
            CheckedRoute::Invalid(_) => None,
        }
    }
}

/// Validate every route and return all errors found, in declaration order.
pub fn validate(routes: &[(String, RouteDef)]) -> Vec<ValidationError> {
    routes
        .iter()
        .flat_map(|(name, def)| check_route(name, def).errors().to_vec())
        .collect()
}

/// Check one route, in order: rewrites, fix, skip.
pub fn check_route(name: &str, def: &RouteDef) -> CheckedRoute {
    let name = if name.is_empty() { "Unknown" } else { name };
    let mut errors = Vec::new();

    let rewrites = check_rewrites(name, def.rewrite.as_ref(), &mut errors);
    let fix = check_fix(name, def.fix.as_ref(), &mut errors);
    let skip = check_skip(name, def.skip.as_ref(), &mut errors);

    // fix and skip errors are route-level; only entry errors are survivable.
    let route_level_error = errors.iter().any(|e| {
        matches!(
            e,
            ValidationError::NoRewrites { .. }
                | ValidationError::InvalidFix { .. }
                | ValidationError::InvalidSkip { .. }
                | ValidationError::InvalidSkipEntry { .. }
        )
    });

    if route_level_error || rewrites.is_empty() {
        return CheckedRoute::Invalid(errors);
    }

    let route = Route {
        name: name.to_string(),
        rewrites,
        skip,
        fix,
    };

    if errors.is_empty() {
        CheckedRoute::Valid(route)
    } else {
        CheckedRoute::Degraded(route, errors)
    }
}

fn check_rewrites(
    name: &str,
    value: Option<&RuleValue>,
    errors: &mut Vec<ValidationError>,
) -> Vec<RewriteEntry> {
    let items = match value {
        Some(RuleValue::List(items)) if !items.is_empty() => items,
        _ => {
            errors.push(ValidationError::NoRewrites {
                route: name.to_string(),
            });
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| match item {
            RuleValue::Rewrite(def) => check_entry(name, def, errors),
            other => {
                errors.push(ValidationError::InvalidEntry {
                    route: name.to_string(),
                    found: other.kind().to_string(),
                });
                None
            }
        })
        .collect()
}

fn check_entry(
    name: &str,
    def: &RewriteDef,
    errors: &mut Vec<ValidationError>,
) -> Option<RewriteEntry> {
    let remote = match def.remote.as_deref() {
        Some(value) => as_remote(value),
        None => None,
    };
    if remote.is_none() {
        errors.push(ValidationError::InvalidRemote {
            route: name.to_string(),
            found: kind_of(def.remote.as_deref()).to_string(),
        });
    }

    let local = match def.local.as_deref() {
        Some(RuleValue::Text(template)) => Some(Local::Template(template.clone())),
        Some(RuleValue::Function(f)) => Some(Local::Mapper(f.clone())),
        _ => None,
    };
    if local.is_none() {
        errors.push(ValidationError::InvalidLocal {
            route: name.to_string(),
            found: kind_of(def.local.as_deref()).to_string(),
        });
    }

    Some(RewriteEntry {
        remote: remote?,
        local: local?,
    })
}

fn check_fix(
    name: &str,
    value: Option<&RuleValue>,
    errors: &mut Vec<ValidationError>,
) -> Option<PathFn> {
    match value {
        None => None,
        Some(RuleValue::Function(f)) => Some(f.clone()),
        Some(other) => {
            errors.push(ValidationError::InvalidFix {
                route: name.to_string(),
                found: other.kind().to_string(),
            });
            None
        }
    }
}

fn check_skip(
    name: &str,
    value: Option<&RuleValue>,
    errors: &mut Vec<ValidationError>,
) -> Option<Vec<Remote>> {
    let items = match value {
        None => return None,
        Some(RuleValue::List(items)) => items,
        Some(other) => {
            errors.push(ValidationError::InvalidSkip {
                route: name.to_string(),
                found: other.kind().to_string(),
            });
            return None;
        }
    };

    let mut skip = Vec::with_capacity(items.len());
    for item in items {
        match as_remote(item) {
            Some(remote) => skip.push(remote),
            None => errors.push(ValidationError::InvalidSkipEntry {
                route: name.to_string(),
                found: item.kind().to_string(),
            }),
        }
    }
    Some(skip)
}

fn as_remote(value: &RuleValue) -> Option<Remote> {
    match value {
        RuleValue::Text(prefix) => Some(Remote::Prefix(prefix.clone())),
        RuleValue::Pattern(regex) => Some(Remote::Pattern(regex.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_rule() -> RewriteDef {
        RewriteDef::new(
            RuleValue::text("http://www.some.site/dir"),
            RuleValue::text("some/dir"),
        )
    }

    fn routes(def: RouteDef) -> Vec<(String, RouteDef)> {
        vec![("test".to_string(), def)]
    }

    #[test]
    fn accepts_string_route() {
        assert!(validate(&routes(RouteDef::new([string_rule()]))).is_empty());
    }

    #[test]
    fn accepts_string_route_with_fix() {
        let def = RouteDef::new([string_rule()]).with_fix(|found| Ok(found.to_string()));
        assert!(validate(&routes(def)).is_empty());
    }

    #[test]
    fn accepts_pattern_remote_with_local_function() {
        let def = RouteDef::new([RewriteDef::new(
            RuleValue::pattern("[a-z]+").unwrap(),
            RuleValue::function(|remote| Ok(remote.to_string())),
        )]);
        assert!(validate(&routes(def)).is_empty());
    }

    #[test]
    fn accepts_skip_of_strings_and_patterns() {
        let def = RouteDef::new([string_rule()])
            .with_skip([RuleValue::text("some"), RuleValue::pattern("stuff").unwrap()]);
        assert!(validate(&routes(def)).is_empty());
    }

    #[test]
    fn rejects_missing_remote() {
        let def = RouteDef::new([RewriteDef {
            remote: None,
            local: Some(Box::new(RuleValue::text("some/dir"))),
        }]);
        let errors = validate(&routes(def));
        assert_eq!(
            errors,
            vec![ValidationError::InvalidRemote {
                route: "test".into(),
                found: "nothing".into()
            }]
        );
    }

    #[test]
    fn rejects_missing_local() {
        let def = RouteDef::new([RewriteDef {
            remote: Some(Box::new(RuleValue::text("http://www.some.site/dir"))),
            local: None,
        }]);
        assert_eq!(validate(&routes(def)).len(), 1);
    }

    #[test]
    fn rejects_function_remote() {
        let def = RouteDef::new([RewriteDef::new(
            RuleValue::function(|_| Ok("fail".into())),
            RuleValue::text("some/dir"),
        )]);
        let errors = validate(&routes(def));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "test route has invalid rewrite.remote entry (expected string or pattern, but function given)"
        );
    }

    #[test]
    fn rejects_pattern_local() {
        let def = RouteDef::new([RewriteDef::new(
            RuleValue::text("http://www.some.site/dir"),
            RuleValue::pattern("[a-z]+").unwrap(),
        )]);
        assert_eq!(validate(&routes(def)).len(), 1);
    }

    #[test]
    fn rejects_non_function_fix() {
        let mut def = RouteDef::new([string_rule()]);
        def.fix = Some(RuleValue::pattern("[a-z]+").unwrap());
        let errors = validate(&routes(def));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "test route has invalid fix function (pattern given)");
    }

    #[test]
    fn rejects_non_list_skip() {
        let mut def = RouteDef::new([string_rule()]);
        def.skip = Some(RuleValue::Other("null".into()));
        assert_eq!(validate(&routes(def)).len(), 1);
    }

    #[test]
    fn rejects_missing_and_empty_rewrites() {
        let missing = RouteDef::default();
        let empty = RouteDef::new([]);
        let errors = validate(&[("a".to_string(), missing), ("b".to_string(), empty)]);
        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["a route has no rewrite rules", "b route has no rewrite rules"]
        );
    }

    #[test]
    fn collects_errors_across_routes_and_entries() {
        let broken = RouteDef::new([RewriteDef::default()]);
        let errors = validate(&routes(broken));
        // remote and local both reported for the same entry
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn partially_broken_route_is_degraded() {
        let def = RouteDef::new([string_rule(), RewriteDef::default()]);
        match check_route("test", &def) {
            CheckedRoute::Degraded(route, errors) => {
                assert_eq!(route.rewrites.len(), 1);
                assert_eq!(errors.len(), 2);
            }
            other => panic!("expected degraded route, got {:?}", other),
        }
    }

    #[test]
    fn bad_fix_invalidates_whole_route() {
        let mut def = RouteDef::new([string_rule()]);
        def.fix = Some(RuleValue::text("not a function"));
        assert!(check_route("test", &def).into_route().is_none());
    }

    #[test]
    fn validation_is_repeatable() {
        let input = routes(RouteDef::new([RewriteDef::default(), string_rule()]));
        assert_eq!(validate(&input), validate(&input));
    }
}
