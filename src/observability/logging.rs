//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the process-wide tracing subscriber
//! - Provide the three-severity sink the routing core reports through
//! - Gate severities by an explicit filter value (no global switches)
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `error` → `tracing::error!`, `warning` → `tracing::warn!`, `notice` → `tracing::info!`
//! - Disabled severities and empty messages are silent no-ops

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Severity of a routing diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Notice,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Notice];
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
        };
        f.write_str(label)
    }
}

/// Set of severities that are allowed through to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    enabled: HashSet<Severity>,
}

impl LogFilter {
    pub fn new(enabled: impl IntoIterator<Item = Severity>) -> Self {
        Self {
            enabled: enabled.into_iter().collect(),
        }
    }

    /// A filter that lets nothing through.
    pub fn silent() -> Self {
        Self::new([])
    }

    pub fn allows(&self, severity: Severity) -> bool {
        self.enabled.contains(&severity)
    }
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new(Severity::ALL)
    }
}

/// Sink for human-readable routing diagnostics.
///
/// Calls are synchronous and fire-and-forget.
pub trait LogSink: Send + Sync + std::fmt::Debug {
    fn log(&self, severity: Severity, text: &str);

    fn error(&self, text: &str) {
        self.log(Severity::Error, text);
    }

    fn warning(&self, text: &str) {
        self.log(Severity::Warning, text);
    }

    fn notice(&self, text: &str) {
        self.log(Severity::Notice, text);
    }
}

/// Tracing-backed sink used by the running proxy.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    filter: LogFilter,
}

impl Logger {
    pub fn new(filter: LogFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }
}

impl LogSink for Logger {
    fn log(&self, severity: Severity, text: &str) {
        if text.is_empty() || !self.filter.allows(severity) {
            return;
        }
        match severity {
            Severity::Error => tracing::error!("{}", text),
            Severity::Warning => tracing::warn!("{}", text),
            Severity::Notice => tracing::info!("{}", text),
        }
    }
}

/// Sink that keeps every accepted message in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    filter: LogFilter,
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: LogFilter) -> Self {
        Self {
            filter,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything logged so far.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Messages logged at the given severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, text)| text)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, text: &str) {
        if text.is_empty() || !self.filter.allows(severity) {
            return;
        }
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((severity, text.to_string()));
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_directives` when set.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_gates_severities() {
        let sink = MemorySink::with_filter(LogFilter::new([Severity::Error]));
        sink.error("broken");
        sink.warning("missing file");
        sink.notice("started");

        assert_eq!(sink.entries(), vec![(Severity::Error, "broken".to_string())]);
    }

    #[test]
    fn empty_messages_are_dropped() {
        let sink = MemorySink::new();
        sink.warning("");
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn severities_parse_from_config_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            log: Vec<Severity>,
        }
        let parsed: Wrapper = toml::from_str(r#"log = ["error", "notice"]"#).unwrap();
        assert_eq!(parsed.log, vec![Severity::Error, Severity::Notice]);
    }
}
