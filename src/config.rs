//! Runtime configuration for the mock server.

use crate::error::ConfigError;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

/// Main configuration for the mock server.
#[derive(Debug, Clone)]
pub struct MockyConfig {
    /// OpenAPI document to serve (YAML or JSON)
    pub file: PathBuf,

    /// Hostname or IP address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Verbose logging
    pub debug: bool,

    /// Count registered routes
    pub metrics: bool,
}

fn default_file() -> PathBuf {
    PathBuf::from("openapi.yaml")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for MockyConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            host: default_host(),
            port: default_port(),
            debug: false,
            metrics: false,
        }
    }
}

impl MockyConfig {
    /// Resolve `host:port` to the address to listen on.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        let bind_error = |reason: String| ConfigError::BindAddress {
            addr: addr.clone(),
            reason,
        };

        addr.to_socket_addrs()
            .map_err(|e| bind_error(e.to_string()))?
            .next()
            .ok_or_else(|| bind_error("host resolved to no addresses".to_string()))
    }
}
