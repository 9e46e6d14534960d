// Copyright (c) 2025 - Cowboy AI, Inc.
//! Placement Domain Models
//!
//! Documents exchanged with the control plane and the pure rules that apply to
//! them. Nothing here performs I/O except through the [`TagLookup`] seam used
//! by tag policies.
//!
//! # Documents
//!
//! - [`Tag`] - key/value label, matched by its exact `(key, value)` pair
//! - [`ResourcePoolState`] - elastic resource pool with custom properties
//! - [`TagPolicy`] - tag links a placement zone requires (EPZ state)
//! - [`PlacementZone`] - a resource pool together with its tag policy
//!
//! # Wire shape
//!
//! ```text
//! PlacementZone
//! ├── resourcePoolState: { name, maxCpuCount, maxMemoryBytes, customProperties, documentSelfLink }
//! ├── epzState: { resourcePoolLink, tagLinksToMatch, documentSelfLink } | null
//! └── documentSelfLink
//! ```

pub mod placement_zone;
pub mod policy;
pub mod resource_pool;
pub mod tag;

pub use placement_zone::{PlacementZone, PlacementZoneList};
pub use policy::{TagLookup, TagPolicy};
pub use resource_pool::{
    parse_custom_properties, CustomProperties, ResourcePoolState, AVAILABLE_MEMORY_PROPERTY,
    CPU_USAGE_PROPERTY,
};
pub use tag::{Tag, TagList};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A self-link counts as set only when it is present and non-empty
pub(crate) fn link_is_set(link: &Option<String>) -> bool {
    link.as_deref().is_some_and(|l| !l.is_empty())
}
