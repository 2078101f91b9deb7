//! Forwarding targets.

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;

/// Port used when the Host header does not name one.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Where a request gets forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTarget {
    pub host: String,
    pub port: u16,
}

impl ForwardTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Target for a `Host` header value (`host` or `host:port`).
    ///
    /// A missing or unparsable port means port 80.
    pub fn from_host_header(value: &str) -> Self {
        match Authority::from_str(value) {
            Ok(authority) => Self::new(
                authority.host(),
                authority.port_u16().unwrap_or(DEFAULT_HTTP_PORT),
            ),
            Err(_) => {
                let host = value.split(':').next().unwrap_or(value);
                Self::new(host, DEFAULT_HTTP_PORT)
            }
        }
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn authority(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl From<SocketAddr> for ForwardTarget {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

impl std::fmt::Display for ForwardTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.authority())
    }
}
