//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ConfigIssue};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ConfigIssue>),
}

fn join(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listener_overrides() {
        let config = parse_config(
            r#"
            [listener]
            proxy_address = "127.0.0.1:18000"
            file_server_address = "127.0.0.1:19000"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.proxy_address, "127.0.0.1:18000");
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        assert!(matches!(parse_config("log = ["), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn semantic_errors_are_validation_errors() {
        let err = parse_config("[timeouts]\nconnect_secs = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.connect_secs must be greater than zero"
        );
    }

    #[test]
    fn bad_routes_do_not_fail_loading() {
        let config = parse_config("[routes.broken]\nrewrite = 1").unwrap();
        assert_eq!(config.routes.len(), 1);
    }

    #[test]
    fn example_config_loads_with_valid_routes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("devproxy.example.toml");
        let config = load_config(&path).unwrap();
        let defs = crate::config::routes::route_defs(&config.routes);
        assert_eq!(defs.len(), 1);
        assert!(crate::routing::validate(&defs).is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("dev-proxy-{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }
}
