//! Request models
//!
//! Defines the peer lookup request and the front-end API query.

use serde::{Deserialize, Serialize};

/// Lookup of `key` in `group` on a remote peer.
///
/// Travels in the request path as `<group>/<key>`, both URL-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRequest {
    /// Name of the group to look in
    pub group: String,
    /// The cache key
    pub key: String,
}

impl PeerRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }

    /// Path of this request relative to the peer's base URL.
    pub fn path(&self) -> String {
        format!(
            "{}/{}",
            urlencoding::encode(&self.group),
            urlencoding::encode(&self.key)
        )
    }
}

/// Query string of `GET /api?group=<group>&key=<key>`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiQuery {
    pub group: String,
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_escapes_segments() {
        let req = PeerRequest::new("scores", "Tom");
        assert_eq!(req.path(), "scores/Tom");

        let req = PeerRequest::new("my group", "a/b?c");
        assert_eq!(req.path(), "my%20group/a%2Fb%3Fc");
    }

    #[test]
    fn test_api_query_deserialize() {
        let json = r#"{"group": "scores", "key": "Tom"}"#;
        let query: ApiQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.group, "scores");
        assert_eq!(query.key, "Tom");
    }
}
