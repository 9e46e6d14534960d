// Copyright (c) 2025 - Cowboy AI, Inc.
//! Short ID resolution
//!
//! Users pass shortened IDs; requests need the full ID behind them. An
//! [`IdResolver`] maps one to the other for a given [`ResourceKind`].

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::domain::null_as_default;
use crate::errors::{PlacementError, PlacementResult};
use crate::links::{self, ResourceKind};
use crate::transport::{decode, Method, Transport};

/// Maps a short ID back to the full ID of a server document
#[async_trait]
pub trait IdResolver: Send + Sync {
    async fn resolve_full_id(&self, short_id: &str, kind: ResourceKind) -> PlacementResult<String>;
}

/// Links of a listing, without the documents
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingLinks {
    #[serde(default, deserialize_with = "null_as_default")]
    document_links: Vec<String>,
}

/// Resolves short IDs by prefix against the kind's full listing
///
/// An exact ID match wins. Otherwise the short ID must be a prefix of exactly
/// one document's ID.
pub struct ListingResolver {
    transport: Arc<dyn Transport>,
}

impl ListingResolver {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

/// Pick the single ID that `short_id` designates among `ids`
pub fn match_short_id<'a>(
    short_id: &str,
    ids: impl IntoIterator<Item = &'a str>,
    kind: ResourceKind,
) -> PlacementResult<String> {
    let mut candidates = Vec::new();
    for id in ids {
        if id == short_id {
            return Ok(id.to_string());
        }
        if id.starts_with(short_id) {
            candidates.push(id);
        }
    }

    match candidates.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(PlacementError::NotFound {
            kind,
            name: short_id.to_string(),
        }),
        _ => Err(PlacementError::Ambiguous {
            kind,
            name: short_id.to_string(),
            count: candidates.len(),
        }),
    }
}

#[async_trait]
impl IdResolver for ListingResolver {
    async fn resolve_full_id(&self, short_id: &str, kind: ResourceKind) -> PlacementResult<String> {
        if short_id.is_empty() {
            return Err(PlacementError::NotFound {
                kind,
                name: String::new(),
            });
        }

        let response = self
            .transport
            .send(Method::Get, &kind.listing_path(), None)
            .await?;
        let listing: ListingLinks = decode(&response.body, &format!("{} listing", kind))?;

        let full_id = match_short_id(
            short_id,
            listing.document_links.iter().map(|link| links::resource_id(link)),
            kind,
        )?;
        debug!("Resolved {} {} to {}", kind, short_id, full_id);
        Ok(full_id)
    }
}
