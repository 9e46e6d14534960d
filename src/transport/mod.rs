// Copyright (c) 2025 - Cowboy AI, Inc.
//! Transport to the control plane
//!
//! The placement layer never talks HTTP directly. Every round trip goes through
//! a [`Transport`], which sends a request to a path relative to the configured
//! base URL and hands back the raw response body.
//!
//! ```text
//! Directory / TagRegistry
//!     ↓  send(method, path, body)
//! Transport ──→ HttpTransport (reqwest)
//!           └─→ InMemoryControlPlane (feature `test-util`)
//! ```
//!
//! A transport returns `Err` for anything that is not a successful response, so
//! callers only ever decode bodies of successful requests.

#[cfg(feature = "http")]
pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::errors::{PlacementError, PlacementResult};

#[cfg(feature = "http")]
pub use http::HttpTransport;
#[cfg(any(test, feature = "test-util"))]
pub use memory::InMemoryControlPlane;

/// HTTP methods used against the control plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful response from the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Request/response primitive supplied by the session layer
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request to `path` (relative to the base URL)
    ///
    /// Network failures and non-success statuses are reported as
    /// [`PlacementError::Transport`].
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> PlacementResult<Response>;
}

/// Decode a response body, naming what was expected on failure
pub fn decode<T: DeserializeOwned>(body: &[u8], context: &str) -> PlacementResult<T> {
    serde_json::from_slice(body).map_err(|e| PlacementError::Decode {
        context: context.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    #[test]
    fn test_decode_reports_context() {
        let named: Named = decode(br#"{"name":"zone1"}"#, "named document").unwrap();
        assert_eq!(named.name, "zone1");

        let err = decode::<Named>(b"not json", "named document").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().starts_with("Failed to decode named document"));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
