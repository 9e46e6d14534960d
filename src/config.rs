// Copyright (c) 2025 - Cowboy AI, Inc.
//! Control plane connection configuration

use serde::{Deserialize, Serialize};

use crate::errors::{PlacementError, PlacementResult};

/// Environment variable holding the control plane base URL
pub const URL_ENV: &str = "CONTROL_PLANE_URL";

/// Environment variable holding the session token
pub const TOKEN_ENV: &str = "CONTROL_PLANE_TOKEN";

/// Environment variable overriding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "CONTROL_PLANE_TIMEOUT_SECS";

/// Configuration for the control plane connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    /// Base URL (e.g., "https://cp.example.com:8282")
    pub base_url: String,

    /// Session token obtained at login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8282".to_string(),
            auth_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ControlPlaneConfig {
    /// Create a configuration for the given base URL
    ///
    /// Trailing slashes are dropped so paths can be appended verbatim.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set the session token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> PlacementResult<Self> {
        Self::from_env_with_url(None)
    }

    /// Load configuration from environment variables, taking the base URL
    /// from `base_url` when given
    pub fn from_env_with_url(base_url: Option<&str>) -> PlacementResult<Self> {
        Self::from_lookup(|name| match (name, base_url) {
            (URL_ENV, Some(url)) => Some(url.to_string()),
            _ => std::env::var(name).ok(),
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PlacementResult<Self> {
        let base_url = lookup(URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| PlacementError::Configuration(format!("{} not set", URL_ENV)))?;

        let mut config = Self::new(base_url.trim());

        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.is_empty()) {
            config = config.with_auth_token(token);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let timeout = raw.trim().parse().map_err(|_| {
                PlacementError::Configuration(format!("{} is not a number: {}", TIMEOUT_ENV, raw))
            })?;
            config = config.with_timeout(timeout);
        }

        Ok(config)
    }
}
