//! API Module
//!
//! HTTP handlers and routing for a cache node.
//!
//! # Endpoints
//! - `GET <base path><group>/<key>` - Peer lookup (wire-encoded body)
//! - `GET /api?group=<group>&key=<key>` - Front-end lookup (raw value)
//! - `GET /stats` - Per-group statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
