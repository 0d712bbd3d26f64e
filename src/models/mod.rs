//! Request and Response models
//!
//! Peer protocol messages, their wire codec, and the JSON DTOs served by the
//! node's HTTP API.

pub mod requests;
pub mod responses;
pub mod wire;

// Re-export commonly used types
pub use requests::{ApiQuery, PeerRequest};
pub use responses::{GroupStatsResponse, HealthResponse, PeerResponse, StatsResponse};
pub use wire::WireFormat;
