//! HTTP Pool
//!
//! Registry of known peers (hash ring + one client per peer) and the
//! server-side logic answering lookups from those peers.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{PeerRequest, PeerResponse, WireFormat};
use crate::peers::{HttpGetter, PeerGetter, PeerPicker};
use crate::ring::{HashFn, HashRing, DEFAULT_REPLICAS};

/// Mount prefix of the peer protocol.
pub const DEFAULT_BASE_PATH: &str = "/_groupcache/";

/// Default bound on a single peer fetch.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(3);

// == Pool Options ==
/// Tuning of an [`HttpPool`].
#[derive(Clone)]
pub struct PoolOptions {
    /// URL prefix peer requests are served under; starts and ends with `/`
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Ring hash; CRC-32 when `None`
    pub hash: Option<HashFn>,
    /// Body layout of peer responses, both served and expected
    pub wire_format: WireFormat,
    /// Timeout of a single peer fetch
    pub peer_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            wire_format: WireFormat::default(),
            peer_timeout: DEFAULT_PEER_TIMEOUT,
        }
    }
}

impl fmt::Debug for PoolOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolOptions")
            .field("base_path", &self.base_path)
            .field("replicas", &self.replicas)
            .field("custom_hash", &self.hash.is_some())
            .field("wire_format", &self.wire_format)
            .field("peer_timeout", &self.peer_timeout)
            .finish()
    }
}

/// Ring and clients, always replaced together.
#[derive(Debug)]
struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// Peer registry and peer-request server of one node.
#[derive(Debug)]
pub struct HttpPool {
    /// This node's identifier, e.g. `http://10.0.0.1:8001`
    self_url: String,
    options: PoolOptions,
    client: reqwest::Client,
    peers: RwLock<PeerSet>,
}

fn normalize(peer: &str) -> String {
    peer.trim_end_matches('/').to_string()
}

impl HttpPool {
    /// Creates a pool for the node reachable at `self_url`, with default options.
    pub fn new(self_url: &str) -> Result<Self> {
        Self::with_options(self_url, PoolOptions::default())
    }

    pub fn with_options(self_url: &str, options: PoolOptions) -> Result<Self> {
        let base_path = &options.base_path;
        if base_path.len() < 2 || !base_path.starts_with('/') || !base_path.ends_with('/') {
            return Err(CacheError::Config(format!(
                "base path must start and end with '/': {:?}",
                base_path
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(options.peer_timeout)
            .build()
            .map_err(|e| CacheError::Config(format!("building peer client: {}", e)))?;

        let peers = PeerSet {
            ring: HashRing::new(options.replicas, options.hash.clone()),
            getters: HashMap::new(),
        };

        Ok(Self {
            self_url: normalize(self_url),
            options,
            client,
            peers: RwLock::new(peers),
        })
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    pub fn wire_format(&self) -> WireFormat {
        self.options.wire_format
    }

    // == Set ==
    /// Replaces the full peer list (which should include this node) and
    /// rebuilds the ring and clients from it.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| normalize(p.as_ref())).collect();

        let mut ring = HashRing::new(self.options.replicas, self.options.hash.clone());
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.options.base_path),
                    self.client.clone(),
                    self.options.wire_format,
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.peers.write() = PeerSet { ring, getters };
        info!("[Server {}] peers set to {:?}", self.self_url, peers);
    }

    /// Peer owning `key` on the ring, which may be this node.
    pub fn owner(&self, key: &str) -> Option<String> {
        self.peers.read().ring.get(key).map(str::to_string)
    }

    // == Parse Path ==
    /// Splits `<base path><group>/<key>` into a request.
    ///
    /// A path outside the base path means the handler is mounted wrong and
    /// yields a configuration error.
    pub fn parse_path(&self, path: &str) -> Result<PeerRequest> {
        let rest = path.strip_prefix(self.base_path()).ok_or_else(|| {
            error!("[Server {}] serving unexpected path: {}", self.self_url, path);
            CacheError::Config(format!("pool serving unexpected path: {}", path))
        })?;

        let (group, key) = rest
            .split_once('/')
            .ok_or_else(|| CacheError::BadRequest(format!("expected <group>/<key>, got {:?}", rest)))?;

        let decode = |segment: &str| {
            urlencoding::decode(segment)
                .map(Cow::into_owned)
                .map_err(|_| CacheError::BadRequest(format!("invalid escape in {:?}", segment)))
        };
        Ok(PeerRequest::new(decode(group)?, decode(key)?))
    }

    // == Serve ==
    /// Answers a peer lookup for `path` (the raw, still escaped, request
    /// path) from `registry`, returning the encoded response body.
    pub async fn serve(&self, registry: &GroupRegistry, path: &str) -> Result<Vec<u8>> {
        let request = self.parse_path(path)?;
        debug!("[Server {}] GET {}", self.self_url, path);

        let group = registry
            .get_group(&request.group)
            .ok_or_else(|| CacheError::NoSuchGroup(request.group.clone()))?;
        group.stats().record_server_request();

        let view = group.get(&request.key).await?;
        self.options
            .wire_format
            .encode(&PeerResponse::new(view.byte_slice()))
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.peers.read();
        let peer = peers.ring.get(key)?;
        if peer.is_empty() || peer == self.self_url {
            return None;
        }

        debug!("[Server {}] pick peer {} for {}", self.self_url, peer, key);
        let getter: Arc<dyn PeerGetter> = peers.getters.get(peer)?.clone();
        Some(getter)
    }
}
