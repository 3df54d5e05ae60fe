//! Configuration module for filedrop.

use serde::Deserialize;
use std::path::Path;

use crate::{FiledropError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Service name reported by the health endpoints.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_service_name() -> String {
    "filedrop".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding `uploads/` and `downloads/`.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_root() -> String {
    "data".to_string()
}

fn default_max_upload_size() -> u64 {
    50
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file; empty logs to stdout only.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filedrop.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web API configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebConfig {
    /// Allowed CORS origins (empty = allow any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FiledropError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEDROP_ROOT`: storage root
    /// - `FILEDROP_HOST`: bind address
    /// - `FILEDROP_PORT`: listen port (ignored if not a valid port)
    pub fn apply_env_overrides(&mut self) {
        if let Some(root) = non_empty_env("FILEDROP_ROOT") {
            self.storage.root = root;
        }
        if let Some(host) = non_empty_env("FILEDROP_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty_env("FILEDROP_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.root.trim().is_empty() {
            return Err(FiledropError::Config(
                "storage.root must not be empty".to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(FiledropError::Config(
                "storage.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.service_name, "filedrop");

        assert_eq!(config.storage.root, "data");
        assert_eq!(config.storage.max_upload_size_mb, 50);
        assert_eq!(config.storage.max_upload_size_bytes(), 50 * 1024 * 1024);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/filedrop.log");

        assert!(config.web.cors_origins.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
service_name = "Traders API"

[storage]
root = "/srv/exchange"
max_upload_size_mb = 10

[logging]
level = "debug"
file = "/var/log/filedrop.log"

[web]
cors_origins = ["http://localhost:3000"]
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.service_name, "Traders API");
        assert_eq!(config.storage.root, "/srv/exchange");
        assert_eq!(config.storage.max_upload_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.web.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[storage]
root = "exchange"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.storage.root, "exchange");
        assert_eq!(config.storage.max_upload_size_mb, 50);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.root, "data");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        if let Err(FiledropError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(matches!(result, Err(FiledropError::StorageIo(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 6000\n").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.server.port, 6000);
    }

    #[test]
    fn test_apply_env_overrides() {
        let keys = ["FILEDROP_ROOT", "FILEDROP_HOST", "FILEDROP_PORT"];
        let originals: Vec<_> = keys.iter().map(|k| std::env::var(k).ok()).collect();

        std::env::set_var("FILEDROP_ROOT", "/tmp/exchange");
        std::env::set_var("FILEDROP_HOST", "");
        std::env::set_var("FILEDROP_PORT", "not-a-port");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.storage.root, "/tmp/exchange");
        // Empty and unparsable values are ignored
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);

        std::env::set_var("FILEDROP_PORT", "7001");
        config.apply_env_overrides();
        assert_eq!(config.server.port, 7001);

        for (key, original) in keys.iter().zip(originals) {
            match original {
                Some(val) => std::env::set_var(key, val),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_root() {
        let mut config = Config::default();
        config.storage.root = "  ".to_string();

        let result = config.validate();
        if let Err(FiledropError::Config(msg)) = result {
            assert!(msg.contains("storage.root"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_zero_upload_size() {
        let mut config = Config::default();
        config.storage.max_upload_size_mb = 0;

        assert!(config.validate().is_err());
    }
}
