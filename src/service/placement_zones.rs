// Copyright (c) 2025 - Cowboy AI, Inc.
//! Placement Zone Directory
//!
//! Lists placement zones, resolves user-supplied names and short IDs to a
//! single zone, and creates, edits and removes zones on the control plane.
//!
//! # Edit flow
//!
//! ```text
//! Resolve identity (name → link, short ID → full ID)
//!     ↓
//! Fetch current zone
//!     ↓
//! Apply local changes (rename, remove tags, then add tags)
//!     ↓
//! Encode (empty policy → null)
//!     ↓
//! PATCH /resources/elastic-placement-zones-config/resources/pools/{id}
//! ```
//!
//! Any step that fails ends the operation; nothing is retried. Edits are
//! read-modify-write without a version check, so of two concurrent edits to
//! the same zone the last one submitted wins.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::tags::TagRegistry;
use crate::domain::{
    parse_custom_properties, PlacementZone, PlacementZoneList, ResourcePoolState, TagPolicy,
};
use crate::errors::{PlacementError, PlacementResult};
use crate::links::{self, ResourceKind};
use crate::resolver::{IdResolver, ListingResolver};
use crate::transport::{decode, Method, Transport};

/// Message shown for an empty listing
pub const NO_ELEMENTS_FOUND: &str = "No elements found.";

/// Header row of the rendered listing
pub const LISTING_HEADER: &str = "ID\tNAME\tMEMORY\tCPU\tTAGS";

/// How the user designated a placement zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneRef {
    /// Exact zone name, which must be unique
    Name(String),
    /// Short or full ID
    Id(String),
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRef::Name(name) => write!(f, "{}", name),
            ZoneRef::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Changes applied by [`PlacementZoneDirectory::edit`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneEdit {
    /// New name; left unchanged when empty
    pub new_name: String,
    pub tags_to_add: Vec<String>,
    pub tags_to_remove: Vec<String>,
}

impl ZoneEdit {
    /// Apply the changes to a fetched zone
    ///
    /// Removals run before additions, so a tag named in both lists ends up
    /// present.
    pub async fn apply(&self, zone: &mut PlacementZone, tags: &TagRegistry) -> PlacementResult<()> {
        if !self.new_name.is_empty() {
            zone.resource_pool_state.name = self.new_name.clone();
        }
        zone.epz_state.remove_tags(tags, &self.tags_to_remove).await?;
        zone.epz_state.add_tags(tags, &self.tags_to_add).await?;
        Ok(())
    }
}

/// Placement zone operations against the control plane
///
/// Holds the listing fetched by the last [`list`](Self::list) call; nothing is
/// cached across directories.
pub struct PlacementZoneDirectory {
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn IdResolver>,
    tags: TagRegistry,
    listing: PlacementZoneList,
}

impl PlacementZoneDirectory {
    pub fn new(transport: Arc<dyn Transport>, resolver: Arc<dyn IdResolver>) -> Self {
        let tags = TagRegistry::new(transport.clone());
        Self {
            transport,
            resolver,
            tags,
            listing: PlacementZoneList::default(),
        }
    }

    /// Directory resolving short IDs against the zone listing itself
    pub fn with_listing_resolver(transport: Arc<dyn Transport>) -> Self {
        let resolver = Arc::new(ListingResolver::new(transport.clone()));
        Self::new(transport, resolver)
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Zones of the last listing, in server order
    pub fn zones(&self) -> impl Iterator<Item = &PlacementZone> + '_ {
        self.listing.iter().map(|(_, zone)| zone)
    }

    /// Fetch every placement zone and keep the listing
    ///
    /// Returns the number of zones fetched.
    pub async fn list(&mut self) -> PlacementResult<usize> {
        let response = self
            .transport
            .send(Method::Get, &links::placement_zones_listing(), None)
            .await?;
        self.listing = decode(&response.body, "placement zone listing")?;
        debug!("Fetched {} placement zones", self.listing.documents.len());
        Ok(self.listing.documents.len())
    }

    /// Tab separated table of the last listing
    ///
    /// Fails only on corrupt memory counters; tag names are best effort.
    pub async fn render(&self) -> PlacementResult<String> {
        if self.listing.is_empty() {
            return Ok(NO_ELEMENTS_FOUND.to_string());
        }

        let mut rows = vec![LISTING_HEADER.to_string()];
        for zone in self.zones() {
            let pool = &zone.resource_pool_state;
            let row = [
                pool.id().to_string(),
                pool.name.clone(),
                pool.used_memory_percent()?,
                pool.used_cpu_percent(),
                self.tags.render(&zone.epz_state.tag_links_to_match).await,
            ];
            rows.push(row.join("\t"));
        }
        Ok(rows.join("\n").trim().to_string())
    }

    /// Self-links of every zone in the last listing carrying exactly this name
    pub fn find_links_by_name(&self, name: &str) -> Vec<String> {
        self.listing.links_named(name)
    }

    /// Self-link of the only zone in the last listing carrying this name
    pub fn resolve_unique(&self, name: &str) -> PlacementResult<String> {
        let mut links = self.find_links_by_name(name);
        match links.len() {
            0 => Err(PlacementError::NotFound {
                kind: ResourceKind::PlacementZone,
                name: name.to_string(),
            }),
            1 => Ok(links.remove(0)),
            count => Err(PlacementError::Ambiguous {
                kind: ResourceKind::PlacementZone,
                name: name.to_string(),
                count,
            }),
        }
    }

    /// Short ID designated by `zone`, refreshing the listing for names
    async fn zone_id(&mut self, zone: &ZoneRef) -> PlacementResult<String> {
        match zone {
            ZoneRef::Id(id) => Ok(id.clone()),
            ZoneRef::Name(name) => {
                self.list().await?;
                let link = self.resolve_unique(name)?;
                Ok(links::resource_id(&link).to_string())
            }
        }
    }

    async fn full_id(&self, id: &str) -> PlacementResult<String> {
        self.resolver
            .resolve_full_id(id, ResourceKind::PlacementZone)
            .await
    }

    /// Fetch the current state of one zone by short ID
    pub async fn get(&self, id: &str) -> PlacementResult<PlacementZone> {
        let full_id = self.full_id(id).await?;
        let path = links::placement_zone_filter(&links::pool_link(&full_id));
        let response = self.transport.send(Method::Get, &path, None).await?;
        let mut matches: PlacementZoneList = decode(&response.body, "placement zone")?;

        let link = matches
            .document_links
            .first()
            .cloned()
            .ok_or_else(|| PlacementError::NotFound {
                kind: ResourceKind::PlacementZone,
                name: id.to_string(),
            })?;
        matches
            .documents
            .remove(&link)
            .ok_or_else(|| PlacementError::NotFound {
                kind: ResourceKind::PlacementZone,
                name: id.to_string(),
            })
    }

    /// Name of the resource pool behind a self-link
    pub async fn zone_name(&self, link: &str) -> PlacementResult<String> {
        let response = self.transport.send(Method::Get, link, None).await?;
        let pool: ResourcePoolState = decode(&response.body, "resource pool")?;
        Ok(pool.name)
    }

    /// Delete a zone, returning its ID
    pub async fn remove(&mut self, zone: &ZoneRef) -> PlacementResult<String> {
        let id = self.zone_id(zone).await?;
        let full_id = self.full_id(&id).await?;

        self.transport
            .send(Method::Delete, &links::pool_link(&full_id), None)
            .await?;

        info!("Removed placement zone {}", id);
        Ok(id)
    }

    /// Create a zone, returning the short ID the server assigned
    ///
    /// `custom_properties` are `key=value` strings and `tags` are `key:value`
    /// strings; missing tags are created. A tag that cannot be resolved stops
    /// the operation before the zone is submitted.
    pub async fn add<P, T>(&self, name: &str, custom_properties: &[P], tags: &[T]) -> PlacementResult<String>
    where
        P: AsRef<str>,
        T: AsRef<str> + Sync,
    {
        let pool = ResourcePoolState::new(name, parse_custom_properties(custom_properties));
        let mut policy = TagPolicy::default();
        policy.add_tags(&self.tags, tags).await?;

        let zone = PlacementZone::new(pool, policy);
        let response = self
            .transport
            .send(Method::Post, links::PLACEMENT_ZONES_CONFIG, Some(zone.encode()?))
            .await?;
        let created: PlacementZone = decode(&response.body, "created placement zone")?;

        info!("Created placement zone {} ({})", created.name(), created.id());
        Ok(created.id().to_string())
    }

    /// Rename a zone and change its tags, returning its ID
    pub async fn edit(&mut self, zone: &ZoneRef, changes: &ZoneEdit) -> PlacementResult<String> {
        let id = self.zone_id(zone).await?;
        let full_id = self.full_id(&id).await?;
        let path = links::placement_zone_config_link(&links::pool_link(&full_id));

        let mut current = self.get(&id).await?;
        changes.apply(&mut current, &self.tags).await?;

        self.transport
            .send(Method::Patch, &path, Some(current.encode()?))
            .await?;

        info!("Updated placement zone {}", id);
        Ok(id)
    }
}
