//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::models::WireFormat;
use crate::peers::{PoolOptions, DEFAULT_BASE_PATH};
use crate::ring::DEFAULT_REPLICAS;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// This node's peer identifier (its base URL)
    pub self_url: String,
    /// Every node of the cluster, this one included
    pub peers: Vec<String>,
    /// Byte budget of the demo group
    pub cache_bytes: usize,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Mount prefix of the peer protocol
    pub base_path: String,
    /// Timeout of a single peer fetch in milliseconds
    pub peer_timeout_ms: u64,
    /// Body layout of peer responses
    pub wire_format: WireFormat,
}

/// Reads and parses `name`, falling back to `default` when it is unset or
/// invalid. An invalid value is logged.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Ok(raw) = env::var(name) else {
        return default;
    };

    match raw.parse() {
        Ok(value) => value,
        Err(err) => {
            warn!("Ignoring {}={:?}: {}; using the default", name, raw, err);
            default
        }
    }
}

/// Splits a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn local_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `SELF_URL` - This node's URL (default: http://localhost:<port>)
    /// - `PEERS` - Comma-separated peer URLs (default: this node only)
    /// - `CACHE_BYTES` - Byte budget of the demo group (default: 2048)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `BASE_PATH` - Peer protocol prefix (default: /_groupcache/)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout (default: 3000)
    /// - `WIRE_FORMAT` - `message` or `raw` (default: message)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let server_port = env_or("SERVER_PORT", defaults.server_port);
        let self_url = env::var("SELF_URL").unwrap_or_else(|_| local_url(server_port));
        let peers = env::var("PEERS")
            .map(|raw| parse_list(&raw))
            .ok()
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_url.clone()]);

        Self {
            server_port,
            self_url,
            peers,
            cache_bytes: env_or("CACHE_BYTES", defaults.cache_bytes),
            replicas: env_or("REPLICAS", defaults.replicas),
            base_path: env::var("BASE_PATH").unwrap_or(defaults.base_path),
            peer_timeout_ms: env_or("PEER_TIMEOUT_MS", defaults.peer_timeout_ms),
            wire_format: env_or("WIRE_FORMAT", defaults.wire_format),
        }
    }

    /// Options for this node's [`HttpPool`](crate::peers::HttpPool).
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            hash: None,
            wire_format: self.wire_format,
            peer_timeout: Duration::from_millis(self.peer_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let server_port = 8001;
        Self {
            server_port,
            self_url: local_url(server_port),
            peers: vec![local_url(server_port)],
            cache_bytes: 2 << 10,
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            peer_timeout_ms: 3000,
            wire_format: WireFormat::Message,
        }
    }
}
