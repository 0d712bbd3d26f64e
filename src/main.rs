//! Group Cache node
//!
//! Serves the demo `scores` group to peers and to front-end clients.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use group_cache::api::create_router;
use group_cache::{AppState, CacheError, Config, Getter, GroupRegistry, HttpPool};

/// Slow in-memory stand-in for the authoritative data source.
struct SlowDb {
    rows: HashMap<&'static str, &'static str>,
}

#[async_trait]
impl Getter for SlowDb {
    async fn get(&self, key: &str) -> group_cache::Result<Vec<u8>> {
        info!("[SlowDB] search key {}", key);
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.rows
            .get(key)
            .map(|v| v.as_bytes().to_vec())
            .ok_or_else(|| CacheError::Load(format!("{} not exist", key)))
    }
}

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the `scores` group
/// 4. Create the peer pool and register it with the group
/// 5. Serve peer, API, stats and health endpoints
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "group_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Group Cache node");

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, cache_bytes={}, replicas={}, wire={}",
        config.self_url, config.peers, config.cache_bytes, config.replicas, config.wire_format
    );

    let registry = Arc::new(GroupRegistry::new());
    let db = SlowDb {
        rows: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
    };
    let scores = registry.new_group("scores", config.cache_bytes, Arc::new(db))?;

    let pool = Arc::new(HttpPool::with_options(&config.self_url, config.pool_options())?);
    pool.set(&config.peers);
    scores.register_peers(pool.clone())?;

    let app = create_router(AppState::new(registry, pool));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Node shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
