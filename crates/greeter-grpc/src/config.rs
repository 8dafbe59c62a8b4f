//! Server configuration.

use std::net::{Ipv6Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for [`ServerConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Server configuration.
///
/// Every field is optional in a config file; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// Number of runtime worker threads handling calls
    pub workers: usize,
    /// Register the grpc.health.v1 service
    pub health: bool,
    /// Register the server reflection service
    pub reflection: bool,
    /// Wrap the greeter in the logging interceptor
    pub log_requests: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv6Addr::UNSPECIFIED, 50051)), // [::]:50051
            workers: 10,
            health: true,
            reflection: true,
            log_requests: false,
        }
    }
}

impl ServerConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
