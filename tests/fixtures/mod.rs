// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-placement
//!
//! Provides deterministic placement zones and a ready-wired directory over an
//! in-memory control plane. Zone IDs are fixed constants so tests can address
//! zones by ID without listing them first.

#![allow(dead_code)]

use std::sync::Arc;

use cim_placement::domain::{
    PlacementZone, ResourcePoolState, TagPolicy, AVAILABLE_MEMORY_PROPERTY, CPU_USAGE_PROPERTY,
};
use cim_placement::links;
use cim_placement::{InMemoryControlPlane, PlacementZoneDirectory};

// Fixed zone IDs
pub const ZONE_ID_PROD_1: &str = "5f2a90c1d4e3";
pub const ZONE_ID_PROD_2: &str = "77c1e0b2a9f8";
pub const ZONE_ID_STAGE: &str = "a01b3c5d7e9f";

/// A stored zone with a fixed ID and no tag policy
pub fn zone_fixture(name: &str, id: &str) -> PlacementZone {
    let mut pool = ResourcePoolState::new(name, Default::default());
    pool.document_self_link = Some(links::pool_link(id));
    PlacementZone::new(pool, TagPolicy::default())
}

/// A stored zone reporting memory and CPU counters
pub fn busy_zone_fixture(name: &str, id: &str, max_memory: i64, available: &str, cpu: &str) -> PlacementZone {
    let mut zone = zone_fixture(name, id);
    let pool = &mut zone.resource_pool_state;
    pool.max_cpu_count = 4;
    pool.max_memory_bytes = max_memory;
    pool.custom_properties
        .insert(AVAILABLE_MEMORY_PROPERTY.to_string(), Some(available.to_string()));
    pool.custom_properties
        .insert(CPU_USAGE_PROPERTY.to_string(), Some(cpu.to_string()));
    zone
}

/// An empty control plane and a directory wired to it
pub fn empty_directory() -> (Arc<InMemoryControlPlane>, PlacementZoneDirectory) {
    let plane = Arc::new(InMemoryControlPlane::new());
    let directory = PlacementZoneDirectory::with_listing_resolver(plane.clone());
    (plane, directory)
}

/// Control plane holding two zones named "prod" and one named "stage"
pub fn seeded_directory() -> (Arc<InMemoryControlPlane>, PlacementZoneDirectory) {
    let (plane, directory) = empty_directory();
    plane.seed_zone(zone_fixture("prod", ZONE_ID_PROD_1));
    plane.seed_zone(zone_fixture("prod", ZONE_ID_PROD_2));
    plane.seed_zone(zone_fixture("stage", ZONE_ID_STAGE));
    (plane, directory)
}
