//! Dispatch subsystem: local override or original host.
//!
//! # Data Flow
//! ```text
//! request url + Host header
//!     → routing::Router::remap
//!     → dispatcher.rs (verify candidate via fs.rs)
//!     → Dispatch { outcome, target }
//!     → http layer forwards exactly once to target
//! ```
//!
//! # Design Decisions
//! - Stateless per request; no caching of filesystem answers
//! - Filesystem checks are async so they never stall other requests
//! - Negative outcomes are warnings at most, never errors

pub mod dispatcher;
pub mod fs;
pub mod target;

pub use dispatcher::{Dispatch, Dispatcher, FallbackReason, Outcome};
pub use fs::{FileStat, FileSystem, TokioFs};
pub use target::ForwardTarget;
