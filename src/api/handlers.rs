//! API Handlers
//!
//! HTTP request handlers for each node endpoint.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tracing::error;

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::wire::CONTENT_TYPE;
use crate::models::{ApiQuery, GroupStatsResponse, HealthResponse, StatsResponse};
use crate::peers::HttpPool;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<GroupRegistry>,
    /// Peer registry and peer-request server
    pub pool: Arc<HttpPool>,
}

impl AppState {
    pub fn new(registry: Arc<GroupRegistry>, pool: Arc<HttpPool>) -> Self {
        Self { registry, pool }
    }
}

/// Handler for GET <base path><group>/<key>
///
/// Answers a lookup from another node with a wire-encoded value.
pub async fn peer_handler(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let body = state
        .pool
        .serve(&state.registry, uri.path())
        .await
        .inspect_err(|err| {
            if matches!(err, CacheError::Config(_)) {
                error!("peer handler misconfigured: {}", err);
            }
        })?;

    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}

/// Handler for GET /api?group=<group>&key=<key>
///
/// Looks the key up through the group (cache, owning peer, or loader) and
/// returns the raw value bytes.
pub async fn api_handler(
    State(state): State<AppState>,
    Query(query): Query<ApiQuery>,
) -> Result<impl IntoResponse> {
    let group = state
        .registry
        .get_group(&query.group)
        .ok_or_else(|| CacheError::NoSuchGroup(query.group.clone()))?;

    let view = group.get(&query.key).await?;
    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], view.byte_slice()))
}

/// Handler for GET /stats
///
/// Returns group and store statistics for every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let mut groups = Vec::new();
    for group in state.registry.groups() {
        let cache = group.cache_stats().await;
        groups.push(GroupStatsResponse::new(
            group.name(),
            group.stats().snapshot(),
            cache,
        ));
    }

    Json(StatsResponse {
        node: state.pool.self_url().to_string(),
        groups,
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
