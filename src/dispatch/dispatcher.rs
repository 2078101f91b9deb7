//! Per-request override decision.
//!
//! # States
//! ```text
//! Received → Matching ─┬─ NoMatch ────────────────────────────→ Fallback
//!                      └─ LocalCandidate → VerifyLocal ─┬─ file → ServeLocal
//!                                                       ├─ missing / stat error → Fallback (warning)
//!                                                       └─ directory → Fallback (silent)
//! ```
//!
//! Every path ends in exactly one `Dispatch`, i.e. one forwarding target.

use std::path::PathBuf;
use std::sync::Arc;

use crate::dispatch::fs::{FileSystem, TokioFs};
use crate::dispatch::target::ForwardTarget;
use crate::routing::{Router, RoutingDecision};

/// Why a request goes to the original host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No rewrite claimed the URL (or it was skipped / failed to resolve).
    Unmapped,
    /// The local candidate does not exist.
    NotFound(PathBuf),
    /// The local candidate could not be inspected.
    Unreadable { path: PathBuf, error: String },
    /// The local candidate is a directory; there is no way to pick an index file.
    Directory(PathBuf),
}

impl FallbackReason {
    /// Text worth a warning, if any. Unmapped URLs and directories are routine.
    pub fn diagnostic(&self) -> Option<String> {
        match self {
            FallbackReason::NotFound(path) => Some(format!("file not found: {}", path.display())),
            FallbackReason::Unreadable { path, error } => {
                Some(format!("cannot inspect {}: {}", path.display(), error))
            }
            FallbackReason::Unmapped | FallbackReason::Directory(_) => None,
        }
    }
}

/// Where the request ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ServeLocal(PathBuf),
    Fallback(FallbackReason),
}

/// The single forwarding instruction produced for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub outcome: Outcome,
    pub target: ForwardTarget,
}

impl Dispatch {
    pub fn is_local(&self) -> bool {
        matches!(self.outcome, Outcome::ServeLocal(_))
    }
}

/// Combines the router's decision with filesystem checks.
#[derive(Debug)]
pub struct Dispatcher<F = TokioFs> {
    router: Arc<Router>,
    fs: F,
    local_endpoint: ForwardTarget,
}

impl<F: FileSystem> Dispatcher<F> {
    /// `local_endpoint` is where verified overrides are forwarded (the file server).
    pub fn new(router: Arc<Router>, fs: F, local_endpoint: ForwardTarget) -> Self {
        Self {
            router,
            fs,
            local_endpoint,
        }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn local_endpoint(&self) -> &ForwardTarget {
        &self.local_endpoint
    }

    /// Decide where the request for `url` (with `Host: host`) is forwarded.
    pub async fn dispatch(&self, url: &str, host: &str) -> Dispatch {
        let verified = match self.router.remap(url) {
            RoutingDecision::Local(path) => self.verify_local(PathBuf::from(path)).await,
            RoutingDecision::NoMatch => Err(FallbackReason::Unmapped),
        };

        match verified {
            Ok(path) => {
                tracing::debug!(url = %url, path = %path.display(), "Serving local override");
                Dispatch {
                    outcome: Outcome::ServeLocal(path),
                    target: self.local_endpoint.clone(),
                }
            }
            Err(reason) => {
                if let Some(text) = reason.diagnostic() {
                    self.router.log().warning(&text);
                }
                Dispatch {
                    outcome: Outcome::Fallback(reason),
                    target: ForwardTarget::from_host_header(host),
                }
            }
        }
    }

    async fn verify_local(&self, path: PathBuf) -> Result<PathBuf, FallbackReason> {
        if !self.fs.exists(&path).await {
            return Err(FallbackReason::NotFound(path));
        }
        match self.fs.stat(&path).await {
            Ok(stat) if stat.is_directory => Err(FallbackReason::Directory(path)),
            Ok(_) => Ok(path),
            Err(e) => Err(FallbackReason::Unreadable {
                error: e.to_string(),
                path,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::fs::FileStat;
    use crate::observability::logging::{MemorySink, Severity};
    use crate::routing::{RewriteDef, RouteDef, RuleValue};
    use std::collections::HashMap;
    use std::io;
    use std::path::Path;

    #[derive(Debug, Clone, Copy)]
    enum Entry {
        File,
        Dir,
        Broken,
    }

    #[derive(Debug, Default)]
    struct StubFs(HashMap<PathBuf, Entry>);

    impl StubFs {
        fn with(mut self, path: &str, entry: Entry) -> Self {
            self.0.insert(PathBuf::from(path), entry);
            self
        }
    }

    impl FileSystem for StubFs {
        async fn exists(&self, path: &Path) -> bool {
            self.0.contains_key(path)
        }

        async fn stat(&self, path: &Path) -> io::Result<FileStat> {
            match self.0.get(path) {
                Some(Entry::File) => Ok(FileStat { is_directory: false }),
                Some(Entry::Dir) => Ok(FileStat { is_directory: true }),
                Some(Entry::Broken) => Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
                None => Err(io::ErrorKind::NotFound.into()),
            }
        }
    }

    fn dispatcher(fs: StubFs) -> (Dispatcher<StubFs>, Arc<MemorySink>) {
        let log = Arc::new(MemorySink::new());
        let defs = vec![(
            "pattern".to_string(),
            RouteDef::new([RewriteDef::new(
                RuleValue::pattern(r"^http://ex\.com/(.+)$").unwrap(),
                RuleValue::text("/srv/$1"),
            )]),
        )];
        let router = Arc::new(Router::new(&defs, log.clone()));
        (
            Dispatcher::new(router, fs, ForwardTarget::new("127.0.0.1", 9000)),
            log,
        )
    }

    #[tokio::test]
    async fn existing_file_is_served_locally() {
        let (dispatcher, log) = dispatcher(StubFs::default().with("/srv/a.js", Entry::File));
        let dispatch = dispatcher.dispatch("http://ex.com/a.js", "ex.com").await;

        assert_eq!(dispatch.outcome, Outcome::ServeLocal(PathBuf::from("/srv/a.js")));
        assert_eq!(dispatch.target, ForwardTarget::new("127.0.0.1", 9000));
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn unmapped_url_falls_back_silently_to_port_80() {
        let (dispatcher, log) = dispatcher(StubFs::default());
        let dispatch = dispatcher.dispatch("http://other.com/x", "other.com").await;

        assert_eq!(dispatch.outcome, Outcome::Fallback(FallbackReason::Unmapped));
        assert_eq!(dispatch.target, ForwardTarget::new("other.com", 80));
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn missing_file_falls_back_with_warning() {
        let (dispatcher, log) = dispatcher(StubFs::default());
        let dispatch = dispatcher.dispatch("http://ex.com/gone.js", "ex.com:8080").await;

        assert!(!dispatch.is_local());
        assert_eq!(dispatch.target, ForwardTarget::new("ex.com", 8080));
        assert_eq!(
            log.messages(Severity::Warning),
            vec!["file not found: /srv/gone.js".to_string()]
        );
        assert!(log.messages(Severity::Error).is_empty());
    }

    #[tokio::test]
    async fn directory_falls_back_silently() {
        let (dispatcher, log) = dispatcher(StubFs::default().with("/srv/dir", Entry::Dir));
        let dispatch = dispatcher.dispatch("http://ex.com/dir", "ex.com").await;

        assert_eq!(
            dispatch.outcome,
            Outcome::Fallback(FallbackReason::Directory(PathBuf::from("/srv/dir")))
        );
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn stat_failure_falls_back_with_warning() {
        let (dispatcher, log) = dispatcher(StubFs::default().with("/srv/locked.js", Entry::Broken));
        let dispatch = dispatcher.dispatch("http://ex.com/locked.js", "ex.com").await;

        assert!(!dispatch.is_local());
        assert_eq!(log.messages(Severity::Warning).len(), 1);
    }
}
