use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Maximum queries answered concurrently; excess requests queue
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub log_json: bool,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Path to the pipeline configuration file
    #[serde(default = "default_pipeline_config")]
    pub pipeline_config: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            max_concurrent_queries: default_max_concurrent_queries(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: default_true(),
            pipeline_config: default_pipeline_config(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        // Pull in a .env file if one exists
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("config/server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("RAGLINE").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_max_concurrent_queries() -> usize {
    8
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pipeline_config() -> PathBuf {
    PathBuf::from("config/ragline.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 1);
        assert_eq!(cfg.max_concurrent_queries, 8);
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert_eq!(cfg.pipeline_config, PathBuf::from("config/ragline.yaml"));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_max_body_size_in_bytes() {
        let cfg = ServerConfig {
            max_body_size_mb: 2,
            ..ServerConfig::default()
        };
        assert_eq!(cfg.max_body_size(), 2 * 1024 * 1024);
    }
}
