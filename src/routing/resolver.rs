//! Local path resolution.
//!
//! Turns a matched URL into a candidate filesystem path:
//! - prefix remote + template: strip the prefix, convert `/` to the native
//!   separator, prepend the template
//! - pattern remote + template: substitute `$1`..`$99` with capture groups
//! - any remote + callback: the callback decides

use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

use regex::{Captures, Regex};
use thiserror::Error;

use crate::routing::rule::{CallbackError, Local, Remote, RewriteEntry};

/// Why no local path could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("url {0} does not match the rewrite remote")]
    NoMatch(String),

    #[error("in custom local function, {0}")]
    Callback(#[from] CallbackError),

    #[error("rewrite produced an empty path")]
    Empty,
}

/// Resolve `url` through `entry` into a local path.
pub fn resolve(url: &str, entry: &RewriteEntry) -> Result<String, ResolveError> {
    let path = match (&entry.remote, &entry.local) {
        (_, Local::Mapper(f)) => f.call(url)?,
        (Remote::Prefix(prefix), Local::Template(local)) => {
            let rest = url
                .strip_prefix(prefix.as_str())
                .ok_or_else(|| ResolveError::NoMatch(url.to_string()))?;
            join_native(local, rest)
        }
        (Remote::Pattern(regex), Local::Template(local)) => substitute(url, regex, local)?,
    };

    if path.is_empty() {
        return Err(ResolveError::Empty);
    }
    Ok(path)
}

/// Append the URL remainder to `local`, converting `/` to the native separator.
/// A separator at the seam is kept once.
fn join_native(local: &str, rest: &str) -> String {
    let rest = if local.ends_with('/') || local.ends_with(MAIN_SEPARATOR) {
        rest.strip_prefix('/').unwrap_or(rest)
    } else {
        rest
    };
    let mut path = local.to_string();
    path.push_str(&rest.split('/').collect::<Vec<_>>().join(MAIN_SEPARATOR_STR));
    path
}

fn substitute(url: &str, regex: &Regex, template: &str) -> Result<String, ResolveError> {
    let captures = regex
        .captures(url)
        .ok_or_else(|| ResolveError::NoMatch(url.to_string()))?;
    Ok(expand(template, &captures))
}

/// Single left-to-right pass over `template`. Substituted text is never rescanned.
fn expand(template: &str, captures: &Captures<'_>) -> String {
    let groups = captures.len() - 1;
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' {
            if let Some((index, width)) = placeholder(&bytes[i + 1..], groups) {
                out.push_str(captures.get(index).map_or("", |m| m.as_str()));
                i += 1 + width;
                continue;
            }
        }
        // Copy up to the next '$' in one go.
        let step = template[i..].chars().next().map_or(1, char::len_utf8);
        let next = template[i + step..]
            .find('$')
            .map_or(template.len(), |offset| i + step + offset);
        out.push_str(&template[i..next]);
        i = next;
    }
    out
}

/// Parse the group index after a `$`. Two digits win when that group exists.
fn placeholder(rest: &[u8], groups: usize) -> Option<(usize, usize)> {
    let digit = |i: usize| rest.get(i).filter(|b| b.is_ascii_digit()).map(|b| (b - b'0') as usize);

    let first = digit(0)?;
    if let Some(second) = digit(1) {
        let index = first * 10 + second;
        if (1..=groups).contains(&index) {
            return Some((index, 2));
        }
    }
    (1..=groups).contains(&first).then_some((first, 1))
}
