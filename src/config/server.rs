//! Server configuration module.
//!
//! This module defines configuration related to the RPC server itself: where it
//! listens, which paths it serves, and how long a call may run.

use super::ConfigResult;
use super::Validate;
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name of the server (used in logs)
    pub name: String,

    /// Address to bind the HTTP listener to
    pub address: SocketAddr,

    /// Path that accepts JSON-RPC POST requests
    pub rpc_path: String,

    /// Path that serves the method description export
    pub debug_path: String,

    /// Whether the debug export is served
    pub enable_debug: bool,

    /// Deadline of one transport call in milliseconds, `0` for none
    pub request_timeout_ms: u64,

    /// Number of worker threads of the runtime
    pub worker_threads: usize,
}

impl ServerConfig {
    /// Request deadline, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "kapili-rpc".to_string(),
            address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            rpc_path: "/rpc".to_string(),
            debug_path: "/debug/rpc".to_string(),
            enable_debug: true,
            request_timeout_ms: 30_000,
            worker_threads: num_cpus::get(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Server name cannot be empty".to_string(),
            ));
        }

        for (key, path) in [("rpc_path", &self.rpc_path), ("debug_path", &self.debug_path)] {
            if !path.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must start with '/': {path}"
                )));
            }
        }

        if self.enable_debug && self.rpc_path == self.debug_path {
            return Err(ConfigError::ValidationError(
                "rpc_path and debug_path must differ".to_string(),
            ));
        }

        if self.worker_threads == 0 {
            return Err(ConfigError::ValidationError(
                "worker_threads must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
