//! `[routes.*]` tables → route definitions.
//!
//! # Accepted shapes
//! ```toml
//! [routes.name]
//! rewrite = [
//!   { remote = "http://host/prefix", local = "/local/dir/" },
//!   { remote = { pattern = '^http://host/(\w+)\.js$' }, local = "/src/$1.js" },
//! ]
//! skip = ["http://host/prefix/vendor/", { pattern = 'min\.js$' }]
//! fix = { strip_from = "?r=" }            # or { replace = "a", with = "b" }
//! ```
//!
//! Values of the wrong kind are passed through as `RuleValue::Other` so that
//! route validation reports them.

use crate::routing::fixup::builtin;
use crate::routing::{RewriteDef, RouteDef, RouteDefs, RuleValue};

/// Convert every route table, preserving order.
pub fn route_defs(routes: &toml::Table) -> RouteDefs {
    routes
        .iter()
        .map(|(name, value)| (name.clone(), route_def(value)))
        .collect()
}

fn route_def(value: &toml::Value) -> RouteDef {
    let Some(table) = value.as_table() else {
        return RouteDef::default();
    };

    RouteDef {
        rewrite: table.get("rewrite").map(rewrite_list),
        skip: table.get("skip").map(skip_list),
        fix: table.get("fix").map(fix),
    }
}

fn rewrite_list(value: &toml::Value) -> RuleValue {
    match value {
        toml::Value::Array(items) => RuleValue::list(items.iter().map(rewrite_entry)),
        other => other_kind(other),
    }
}

fn rewrite_entry(value: &toml::Value) -> RuleValue {
    match value.as_table() {
        Some(table) => RuleValue::Rewrite(RewriteDef {
            remote: table.get("remote").map(|v| Box::new(matchable(v))),
            local: table.get("local").map(|v| Box::new(local(v))),
        }),
        None => other_kind(value),
    }
}

fn skip_list(value: &toml::Value) -> RuleValue {
    match value {
        toml::Value::Array(items) => RuleValue::list(items.iter().map(matchable)),
        other => other_kind(other),
    }
}

/// A string, or a `{ pattern = "..." }` table.
fn matchable(value: &toml::Value) -> RuleValue {
    match value {
        toml::Value::String(text) => RuleValue::text(text.as_str()),
        toml::Value::Table(table) => match table.get("pattern").and_then(toml::Value::as_str) {
            Some(source) => RuleValue::pattern(source)
                .unwrap_or_else(|e| RuleValue::Other(format!("invalid pattern `{}` ({})", source, e))),
            None => other_kind(value),
        },
        other => other_kind(other),
    }
}

fn local(value: &toml::Value) -> RuleValue {
    match value {
        toml::Value::String(text) => RuleValue::text(text.as_str()),
        other => other_kind(other),
    }
}

fn fix(value: &toml::Value) -> RuleValue {
    let Some(table) = value.as_table() else {
        return other_kind(value);
    };

    let text = |key: &str| table.get(key).and_then(toml::Value::as_str);
    match (text("strip_from"), text("replace"), text("with")) {
        (Some(marker), None, None) => RuleValue::Function(builtin::strip_from(marker)),
        (None, Some(from), Some(to)) => RuleValue::Function(builtin::replace(from, to)),
        _ => other_kind(value),
    }
}

fn other_kind(value: &toml::Value) -> RuleValue {
    RuleValue::Other(value.type_str().to_string())
}
