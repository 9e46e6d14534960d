// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for placement zone and tag operations

use thiserror::Error;

use crate::links::ResourceKind;
use crate::transport::Method;

/// Errors that can occur while managing placement zones and tags
#[derive(Debug, Error)]
pub enum PlacementError {
    /// User input does not parse as `key` or `key:value`
    #[error("Invalid tag format for input: {input}. Use \"key:value\" format.")]
    MalformedTag { input: String },

    /// A name or ID matched no server document
    #[error("{kind} not found: {name}")]
    NotFound { kind: ResourceKind, name: String },

    /// A name or ID matched more than one server document
    #[error("{count} {kind} documents match '{name}', provide the ID to select a specific one")]
    Ambiguous {
        kind: ResourceKind,
        name: String,
        count: usize,
    },

    /// The control plane could not be reached or rejected the request
    #[error("{method} {path} failed: {message}")]
    Transport {
        method: Method,
        path: String,
        status: Option<u16>,
        message: String,
    },

    /// A response body did not match the expected document shape
    #[error("Failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    /// A server-reported diagnostic counter is not a valid number
    #[error("Invalid value for custom property {key}: {value}")]
    InvalidCounter { key: String, value: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PlacementError {
    /// Whether the error signals broken server data rather than bad user input.
    ///
    /// Fatal errors are not meant to be reported and retried: callers terminate
    /// the command as soon as one surfaces.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlacementError::Decode { .. } | PlacementError::InvalidCounter { .. }
        )
    }

    pub(crate) fn malformed_tag(input: &str) -> Self {
        PlacementError::MalformedTag {
            input: input.to_string(),
        }
    }
}

/// Result type for placement operations
pub type PlacementResult<T> = Result<T, PlacementError>;

impl From<serde_json::Error> for PlacementError {
    fn from(err: serde_json::Error) -> Self {
        PlacementError::Decode {
            context: "JSON document".to_string(),
            message: err.to_string(),
        }
    }
}
