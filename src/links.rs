// Copyright (c) 2025 - Cowboy AI, Inc.
//! Self-links and endpoint paths of the control plane
//!
//! Every server document is identified by its self-link, a path such as
//! `/resources/pools/6f1c...`. The short ID shown to users is the self-link
//! with its collection prefix removed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection prefix of resource pool documents
pub const RESOURCE_POOLS: &str = "/resources/pools/";

/// Collection prefix of tag documents
pub const TAGS: &str = "/resources/tags/";

/// Configuration service combining a resource pool with its tag policy
pub const PLACEMENT_ZONES_CONFIG: &str = "/resources/elastic-placement-zones-config";

/// Query string requesting fully expanded documents
const EXPAND_QUERY: &str = "documentType=true&expand=true";

/// Resource kinds whose short IDs can be resolved back to self-links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    PlacementZone,
    Tag,
}

impl ResourceKind {
    /// Collection prefix of this kind's self-links
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::PlacementZone => RESOURCE_POOLS,
            ResourceKind::Tag => TAGS,
        }
    }

    /// Path of the expanded listing of every document of this kind
    pub fn listing_path(&self) -> String {
        match self {
            ResourceKind::PlacementZone => placement_zones_listing(),
            ResourceKind::Tag => format!("{}?{}", TAGS.trim_end_matches('/'), EXPAND_QUERY),
        }
    }

    /// Short ID of a self-link of this kind
    pub fn short_id<'a>(&self, link: &'a str) -> &'a str {
        link.strip_prefix(self.collection()).unwrap_or(link)
    }

    /// Self-link of the document with the given full ID
    pub fn link(&self, id: &str) -> String {
        format!("{}{}", self.collection(), id)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::PlacementZone => write!(f, "placement zone"),
            ResourceKind::Tag => write!(f, "tag"),
        }
    }
}

/// Last path segment of a self-link
pub fn resource_id(link: &str) -> &str {
    link.rsplit('/').next().unwrap_or(link)
}

/// Self-link of a resource pool
pub fn pool_link(id: &str) -> String {
    ResourceKind::PlacementZone.link(id)
}

/// Self-link of a tag
pub fn tag_link(id: &str) -> String {
    ResourceKind::Tag.link(id)
}

/// Path of the placement zone configuration keyed by its pool self-link
pub fn placement_zone_config_link(pool_link: &str) -> String {
    format!("{}{}", PLACEMENT_ZONES_CONFIG, pool_link)
}

/// Expanded listing of every placement zone
pub fn placement_zones_listing() -> String {
    format!("{}?{}", PLACEMENT_ZONES_CONFIG, EXPAND_QUERY)
}

/// Quoted filter literal: `'` doubled, then percent-encoded
fn filter_literal(value: &str) -> String {
    urlencoding::encode(&value.replace('\'', "''")).into_owned()
}

/// Expanded listing restricted to the zone whose pool has the given self-link
pub fn placement_zone_filter(pool_link: &str) -> String {
    format!(
        "{}&$filter=documentSelfLink+eq+'{}'",
        placement_zones_listing(),
        filter_literal(pool_link)
    )
}

/// Expanded tag listing restricted to an exact key/value pair
pub fn tag_filter(key: &str, value: &str) -> String {
    format!(
        "{}?{}&$filter=key+eq+'{}'+and+value+eq+'{}'",
        TAGS.trim_end_matches('/'),
        EXPAND_QUERY,
        filter_literal(key),
        filter_literal(value)
    )
}
