//! Error types for the group cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the group cache.
///
/// Errors are `Clone` so a single coalesced load can hand the same failure
/// to every waiting caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The reserved "no key supplied" key was requested
    #[error("key is required")]
    InvalidKey,

    /// The loader could not produce a value (message is the loader's own)
    #[error("{0}")]
    Load(String),

    /// Transport failure while talking to a peer
    #[error("peer request failed: {0}")]
    Peer(String),

    /// Peer answered with a non-success status
    #[error("server returned: {0}")]
    PeerStatus(String),

    /// Peer body could not be decoded as a wire message
    #[error("invalid peer message: {0}")]
    Decode(String),

    /// Peer request named a group this node does not serve
    #[error("no such group: {0}")]
    NoSuchGroup(String),

    /// Malformed peer request path
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Wiring mistake detected at construction or registration time
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// HTTP status used when this error is returned to a remote caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::InvalidKey | CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NoSuchGroup(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the group cache.
pub type Result<T> = std::result::Result<T, CacheError>;
