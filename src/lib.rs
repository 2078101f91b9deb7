//! Local development proxy library.
//!
//! Requests for configured remote URLs are answered from local files;
//! everything else passes through to the original host untouched.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Router, RoutingDecision};
