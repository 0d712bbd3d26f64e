//! HTTP peer client
//!
//! Fetches a group/key from one remote node's peer endpoint.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::models::{PeerRequest, PeerResponse, WireFormat};
use crate::peers::PeerGetter;

/// Client bound to one peer's `<base URL><base path>`.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    base_url: String,
    client: reqwest::Client,
    wire_format: WireFormat,
}

impl HttpGetter {
    /// `base_url` is the peer URL including the mount prefix, e.g.
    /// `http://10.0.0.2:8001/_groupcache/`.
    pub fn new(base_url: impl Into<String>, client: reqwest::Client, wire_format: WireFormat) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            wire_format,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of `request` on this peer.
    pub fn url_for(&self, request: &PeerRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn get(&self, request: &PeerRequest) -> Result<PeerResponse> {
        let url = self.url_for(request);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::Peer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::PeerStatus(status.to_string()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(e.to_string()))?;
        self.wire_format.decode(&body)
    }
}
