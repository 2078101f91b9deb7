//! Per-route post-processing of resolved paths.

use crate::observability::logging::LogSink;
use crate::routing::rule::Route;

/// Apply the route's fix callback to `path`.
///
/// Without a callback the path is returned as-is. A failing callback is
/// logged and the unfixed path is kept.
pub fn apply_fix(path: String, route: &Route, log: &dyn LogSink) -> String {
    let Some(fix) = &route.fix else {
        return path;
    };
    if path.is_empty() {
        return path;
    }

    match fix.call(&path) {
        Ok(fixed) => fixed,
        Err(e) => {
            log.error(&format!("in custom fix function of {} route, {}", route.name, e));
            path
        }
    }
}

/// Fixups that can be declared in a config file.
pub mod builtin {
    use crate::routing::rule::PathFn;

    /// Cut the path at the first occurrence of `marker`, e.g. a `?r=` cache buster.
    pub fn strip_from(marker: impl Into<String>) -> PathFn {
        let marker = marker.into();
        PathFn::new(move |path| {
            Ok(match path.find(marker.as_str()) {
                Some(index) => path[..index].to_string(),
                None => path.to_string(),
            })
        })
    }

    /// Replace the first occurrence of `from` with `to`.
    pub fn replace(from: impl Into<String>, to: impl Into<String>) -> PathFn {
        let (from, to) = (from.into(), to.into());
        PathFn::new(move |path| Ok(path.replacen(from.as_str(), &to, 1)))
    }
}
