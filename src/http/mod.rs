//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! browser (proxy configured)
//!     → server.rs proxy listener
//!     → request.rs (request ID, full URL, Host)
//!     → dispatch layer picks target (file server or original host)
//!     → forwarded once, response streamed back
//!
//! file server listener
//!     → request.rs (full URL from Host + path)
//!     → routing layer remaps again → file from disk or 404
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{build_dispatcher, AppState, HttpServer, ServerError};
