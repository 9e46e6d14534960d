// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tag Registry
//!
//! Finds tags by exact key/value match, creates them on demand and renders
//! tag links for display.
//!
//! # Find or create
//!
//! ```text
//! "env:prod" → Tag::parse → GET /resources/tags?$filter=key eq 'env' and value eq 'prod'
//!                              ├── match    → its ID
//!                              └── no match → POST /resources/tags (when asked) → new ID
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{Tag, TagList, TagLookup};
use crate::errors::PlacementResult;
use crate::links;
use crate::transport::{decode, Method, Transport};

/// Placeholder shown for a zone without tags
pub const NO_TAGS: &str = "n/a";

/// Tag lookups and creation against the control plane
#[derive(Clone)]
pub struct TagRegistry {
    transport: Arc<dyn Transport>,
}

impl TagRegistry {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Short ID of the tag matching `input` exactly
    ///
    /// When nothing matches, the tag is created if `create_if_missing` is set,
    /// otherwise `Ok(None)` is returned. Should several tags match, the first
    /// in server order wins.
    pub async fn find_or_create(
        &self,
        input: &str,
        create_if_missing: bool,
    ) -> PlacementResult<Option<String>> {
        let wanted = Tag::parse(input)?;

        let path = links::tag_filter(&wanted.key, &wanted.value);
        let response = self.transport.send(Method::Get, &path, None).await?;
        let matches: TagList = decode(&response.body, "tag listing")?;

        if let Some(existing) = matches.first() {
            debug!("Found tag {} as {:?}", wanted, existing.document_self_link);
            return Ok(existing.id().map(str::to_string));
        }

        if create_if_missing {
            self.create(&wanted).await
        } else {
            debug!("No tag matches {}", wanted);
            Ok(None)
        }
    }

    /// Store a new tag and return its short ID
    pub async fn create(&self, tag: &Tag) -> PlacementResult<Option<String>> {
        let body = serde_json::to_vec(tag)?;
        let response = self
            .transport
            .send(Method::Post, links::TAGS.trim_end_matches('/'), Some(body))
            .await?;
        let created: Tag = decode(&response.body, "created tag")?;

        info!("Created tag {} at {:?}", created, created.document_self_link);
        Ok(created.id().map(str::to_string))
    }

    /// Fetch a tag by self-link
    pub async fn fetch(&self, link: &str) -> PlacementResult<Tag> {
        let response = self.transport.send(Method::Get, link, None).await?;
        decode(&response.body, "tag")
    }

    /// Render tag links as `[key:value]` entries, `"n/a"` when there are none
    ///
    /// Display is best effort: a tag that cannot be fetched renders as `[:]`.
    pub async fn render<S: AsRef<str>>(&self, tag_links: &[S]) -> String {
        if tag_links.is_empty() {
            return NO_TAGS.to_string();
        }

        let mut rendered = String::new();
        for link in tag_links {
            let link = link.as_ref();
            let tag = match self.fetch(link).await {
                Ok(tag) => tag,
                Err(e) => {
                    warn!("Could not fetch tag {}: {}", link, e);
                    Tag::default()
                }
            };
            rendered.push_str(&tag.to_string());
        }
        rendered
    }
}

#[async_trait]
impl TagLookup for TagRegistry {
    async fn resolve_tag_id(
        &self,
        input: &str,
        create_if_missing: bool,
    ) -> PlacementResult<Option<String>> {
        self.find_or_create(input, create_if_missing).await
    }
}
