//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma separated list of origins allowed to embed the widget
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

/// Shared-project backend configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Base URL serving `/api/share/{share_id}`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User agent sent with fetch requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Comma separated base URLs callers may pass as a per-request
    /// `api_url` override; `api_url` itself is always allowed
    #[serde(default)]
    pub allowed_api_urls: String,
}

fn default_api_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    format!("cuprice/{}", env!("CARGO_PKG_VERSION"))
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON formatted log lines
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.workers", default_workers() as i64)?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("client.api_url", default_api_url())?
            .set_default("client.timeout_ms", default_timeout_ms() as i64)?
            .set_default("client.user_agent", default_user_agent())?
            .set_default("client.allowed_api_urls", "")?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with CUPRICE_ prefix
            .add_source(
                Environment::with_prefix("CUPRICE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("client.api_url", default_api_url())?
            .set_default("logging.level", default_log_level())?
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("CUPRICE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ClientConfig {
    /// Base URLs accepted as a per-request override, normalised
    pub fn allowed_api_urls(&self) -> Vec<String> {
        std::iter::once(self.api_url.as_str())
            .chain(self.allowed_api_urls.split(','))
            .map(normalize_base_url)
            .filter(|url| !url.is_empty())
            .collect()
    }
}

/// Canonical form of a base URL for allowlist comparison
///
/// Trims whitespace and trailing slashes and lower-cases the text.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_ascii_lowercase()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            allowed_api_urls: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://127.0.0.1:3000");
        assert_eq!(config.timeout_ms, 10_000);
        assert!(config.user_agent.starts_with("cuprice/"));
        assert_eq!(config.allowed_api_urls(), vec!["http://127.0.0.1:3000"]);
    }

    #[test]
    fn test_allowed_api_urls_normalized() {
        let config = ClientConfig {
            allowed_api_urls: " https://App.Example.com/ ,, https://eu.example.com".to_string(),
            ..ClientConfig::default()
        };

        assert_eq!(
            config.allowed_api_urls(),
            vec![
                "http://127.0.0.1:3000",
                "https://app.example.com",
                "https://eu.example.com",
            ]
        );
        assert_eq!(normalize_base_url("HTTP://Host:8080//"), "http://host:8080");
    }

    #[test]
    fn test_load_uses_defaults() {
        let config = AppConfig::load().expect("defaults should deserialize");
        assert!(!config.client.api_url.is_empty());
        assert!(config.server.workers >= 1);
        assert_eq!(
            config.server_addr(),
            format!("{}:{}", config.server.host, config.server.port)
        );
    }
}
