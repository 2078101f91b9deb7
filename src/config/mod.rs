//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (listener / timeout checks)
//!     → ProxyConfig (validated, immutable)
//!     → routes.rs (route tables → RouteDefs for the router)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → server rebuilds Router + Dispatcher
//!     → atomic swap; in-flight requests keep the old one
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Route mistakes never prevent startup; they are the router's concern

pub mod loader;
pub mod routes;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, ProxyConfig, TimeoutConfig};
