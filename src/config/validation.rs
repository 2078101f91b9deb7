//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate listener addresses and value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ConfigIssue>>
//! - Route rules are NOT checked here; the router degrades on bad routes
//!   instead of refusing to start

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A semantic problem with the proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("listener.{field} is not a socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.proxy_address and listener.file_server_address must differ ({0})")]
    SharedAddress(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    let proxy = parse_address("proxy_address", &config.listener.proxy_address, &mut issues);
    let files = parse_address(
        "file_server_address",
        &config.listener.file_server_address,
        &mut issues,
    );
    if let (Some(proxy), Some(files)) = (proxy, files) {
        if proxy == files && proxy.port() != 0 {
            issues.push(ConfigIssue::SharedAddress(proxy.to_string()));
        }
    }

    if config.timeouts.connect_secs == 0 {
        issues.push(ConfigIssue::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::ZeroTimeout("request_secs"));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn parse_address(
    field: &'static str,
    value: &str,
    issues: &mut Vec<ConfigIssue>,
) -> Option<SocketAddr> {
    match value.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            issues.push(ConfigIssue::InvalidAddress {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_issue() {
        let mut config = ProxyConfig::default();
        config.listener.proxy_address = "localhost".into();
        config.timeouts.request_secs = 0;

        let issues = validate_config(&config).unwrap_err();
        assert_eq!(
            issues,
            vec![
                ConfigIssue::InvalidAddress {
                    field: "proxy_address",
                    value: "localhost".into()
                },
                ConfigIssue::ZeroTimeout("request_secs"),
            ]
        );
    }

    #[test]
    fn listeners_cannot_share_an_address() {
        let mut config = ProxyConfig::default();
        config.listener.file_server_address = config.listener.proxy_address.clone();
        assert!(matches!(
            validate_config(&config).unwrap_err().as_slice(),
            [ConfigIssue::SharedAddress(_)]
        ));
    }
}
