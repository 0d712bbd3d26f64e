//! Wire format for peer responses
//!
//! Peers agree on one of two body layouts, chosen by configuration:
//! - `Message`: the body is an encoded [`PeerResponse`] (canonical)
//! - `Raw`: the body is the value bytes themselves (legacy peers)

use std::fmt;
use std::str::FromStr;

use bincode::Options;

use crate::error::{CacheError, Result};
use crate::models::PeerResponse;

/// Content type of every peer response body.
pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Body layout of peer responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// Body is the raw value
    Raw,
    /// Body is a length-prefixed `PeerResponse` message
    #[default]
    Message,
}

/// Fixed codec settings; trailing bytes after a message are rejected.
fn codec() -> impl Options {
    bincode::DefaultOptions::new().reject_trailing_bytes()
}

impl WireFormat {
    /// Encodes a response body.
    pub fn encode(&self, response: &PeerResponse) -> Result<Vec<u8>> {
        match self {
            WireFormat::Raw => Ok(response.value.clone()),
            WireFormat::Message => codec()
                .serialize(response)
                .map_err(|e| CacheError::Internal(format!("encode response: {}", e))),
        }
    }

    /// Decodes a response body; truncated or malformed messages fail.
    pub fn decode(&self, body: &[u8]) -> Result<PeerResponse> {
        match self {
            WireFormat::Raw => Ok(PeerResponse::new(body.to_vec())),
            WireFormat::Message => codec()
                .deserialize(body)
                .map_err(|e| CacheError::Decode(e.to_string())),
        }
    }
}

impl FromStr for WireFormat {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(WireFormat::Raw),
            "message" => Ok(WireFormat::Message),
            other => Err(CacheError::Config(format!("unknown wire format: {}", other))),
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Raw => f.write_str("raw"),
            WireFormat::Message => f.write_str("message"),
        }
    }
}
