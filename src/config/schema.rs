//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::observability::logging::{LogFilter, Severity};
use crate::routing::InvalidRoutePolicy;

/// Root configuration for the development proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (proxy and file server addresses).
    pub listener: ListenerConfig,

    /// Severities that reach the log.
    pub log: Vec<Severity>,

    /// What to do with the rule set when a route is malformed.
    pub on_invalid_route: InvalidRoutePolicy,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Route definitions by name, in declaration order.
    ///
    /// Kept as raw TOML so that mistyped values reach route validation
    /// instead of failing the whole file.
    pub routes: toml::Table,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            log: Severity::ALL.to_vec(),
            on_invalid_route: InvalidRoutePolicy::default(),
            timeouts: TimeoutConfig::default(),
            routes: toml::Table::new(),
        }
    }
}

impl ProxyConfig {
    pub fn log_filter(&self) -> LogFilter {
        LogFilter::new(self.log.iter().copied())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Intercepting proxy bind address (e.g., "127.0.0.1:8000").
    pub proxy_address: String,

    /// Local file server bind address; verified overrides are forwarded here.
    pub file_server_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            proxy_address: "127.0.0.1:8000".to_string(),
            file_server_address: "127.0.0.1:9000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}
