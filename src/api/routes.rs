//! API Routes
//!
//! Configures the Axum router with all node endpoints.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{api_handler, health_handler, peer_handler, stats_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET <base path>*` - Peer lookups, mounted under the pool's base path
/// - `GET /api` - Front-end lookup
/// - `GET /stats` - Statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let base_path = state.pool.base_path().to_string();
    let peer_route = format!("{}*path", base_path);

    Router::new()
        .route(&base_path, get(peer_handler))
        .route(&peer_route, get(peer_handler))
        .route("/api", get(api_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::group::{GetterFn, GroupRegistry};
    use crate::models::WireFormat;
    use crate::peers::HttpPool;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let registry = Arc::new(GroupRegistry::new());
        registry
            .new_group(
                "scores",
                2048,
                Arc::new(GetterFn(|key: &str| match key {
                    "Tom" => Ok(b"630".to_vec()),
                    _ => Err(CacheError::Load(format!("{} not exist", key))),
                })),
            )
            .unwrap();
        let pool = Arc::new(HttpPool::new("http://localhost:8001").unwrap());
        create_router(AppState::new(registry, pool))
    }

    async fn get_uri(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_peer_lookup_returns_message() {
        let response = get_uri(create_test_app(), "/_groupcache/scores/Tom").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/octet-stream"
        );

        let body = body_bytes(response).await;
        let decoded = WireFormat::Message.decode(&body).unwrap();
        assert_eq!(decoded.value, b"630");
    }

    #[tokio::test]
    async fn test_peer_lookup_unknown_group() {
        let response = get_uri(create_test_app(), "/_groupcache/users/Tom").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(response).await, b"no such group: users");
    }

    #[tokio::test]
    async fn test_peer_lookup_malformed_path() {
        let response = get_uri(create_test_app(), "/_groupcache/scores").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get_uri(create_test_app(), "/_groupcache/").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_peer_lookup_loader_failure() {
        let response = get_uri(create_test_app(), "/_groupcache/scores/Kate").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_bytes(response).await, b"Kate not exist");
    }

    #[tokio::test]
    async fn test_api_endpoint() {
        let response = get_uri(create_test_app(), "/api?group=scores&key=Tom").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"630");
    }

    #[tokio::test]
    async fn test_api_endpoint_invalid_key() {
        let response = get_uri(create_test_app(), "/api?group=scores&key=nil").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(response).await, b"key is required");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = get_uri(create_test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let response = get_uri(create_test_app(), "/stats").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["groups"][0]["name"], "scores");
    }
}
