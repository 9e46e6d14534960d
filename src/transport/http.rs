// Copyright (c) 2025 - Cowboy AI, Inc.

//! HTTP transport to the control plane REST API
//!
//! # Example
//!
//! ```rust,no_run
//! use cim_placement::config::ControlPlaneConfig;
//! use cim_placement::transport::{HttpTransport, Method, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ControlPlaneConfig::new("https://cp.example.com:8282")
//!         .with_auth_token("token-from-login");
//!
//!     let transport = HttpTransport::new(config)?;
//!     let response = transport
//!         .send(Method::Get, "/resources/tags?documentType=true&expand=true", None)
//!         .await?;
//!     println!("{} bytes", response.body.len());
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Method, Response, Transport};
use crate::config::ControlPlaneConfig;
use crate::errors::{PlacementError, PlacementResult};

/// Header carrying the session token
pub const AUTH_HEADER: &str = "x-xenon-auth-token";

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Transport backed by a `reqwest` client
pub struct HttpTransport {
    config: ControlPlaneConfig,
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(config: ControlPlaneConfig) -> PlacementResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(token) = &config.auth_token {
            headers.insert(
                AUTH_HEADER,
                token.parse::<reqwest::header::HeaderValue>().map_err(|e| {
                    PlacementError::Configuration(format!("Invalid auth token: {}", e))
                })?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                PlacementError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

/// Pull the server's `message` field out of an error body, if it has one
fn error_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value["message"].as_str().map(str::to_string)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> PlacementResult<Response> {
        debug!("{} {}", method, path);

        let mut request = self.client.request(method.into(), self.url(path));
        if let Some(body) = body {
            request = request.body(body);
        }

        let transport_error = |status: Option<u16>, message: String| PlacementError::Transport {
            method,
            path: path.to_string(),
            status,
            message,
        };

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(None, e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(Some(status.as_u16()), e.to_string()))?;

        if status.is_success() {
            Ok(Response {
                status: status.as_u16(),
                body: body.to_vec(),
            })
        } else {
            let message = error_message(&body)
                .unwrap_or_else(|| format!("control plane returned {}", status));
            warn!("{} {} returned {}: {}", method, path, status, message);
            Err(transport_error(Some(status.as_u16()), message))
        }
    }
}
