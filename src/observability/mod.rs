//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / dispatch
//!     → LogSink (severity + plain text, filtered per config)
//!     → Logger → tracing events
//!
//! http / lifecycle
//!     → tracing events directly (request IDs, upstream errors)
//!
//! tracing-subscriber (EnvFilter, fmt) → stderr
//! ```
//!
//! # Design Decisions
//! - The severity filter is owned by whoever builds the sink; no global state
//! - Tests capture rule-engine output with `MemorySink`

pub mod logging;

pub use logging::{init_tracing, LogFilter, LogSink, Logger, MemorySink, Severity};
