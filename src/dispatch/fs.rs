//! Filesystem probing used to verify local override candidates.

use std::future::Future;
use std::io;
use std::path::Path;

/// The part of a file's metadata the dispatcher cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_directory: bool,
}

/// Asynchronous existence/type checks.
///
/// Implementations must not block the runtime worker they are polled on.
pub trait FileSystem: Send + Sync {
    /// True if something exists at `path`. Probe failures read as `false`.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    /// Metadata for `path`.
    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<FileStat>> + Send;
}

/// Real filesystem via `tokio::fs` (blocking calls run on the blocking pool).
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileSystem for TokioFs {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(FileStat {
            is_directory: metadata.is_dir(),
        })
    }
}
