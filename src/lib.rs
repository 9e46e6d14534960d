// Copyright (c) 2025 - Cowboy AI, Inc.
//! Placement zone and tag management for the CIM control plane
//!
//! This crate provides the resource layer of the control plane client:
//! resolving human-supplied names and short IDs to server documents, merging
//! local tag and name edits into the server's current state, and deriving
//! display attributes such as memory and CPU utilization.

pub mod config;
pub mod domain;
pub mod errors;
pub mod links;
pub mod resolver;
pub mod service;
pub mod transport;

// Re-export commonly used types
pub use config::ControlPlaneConfig;
pub use errors::{PlacementError, PlacementResult};
pub use links::ResourceKind;
pub use resolver::{IdResolver, ListingResolver};
pub use service::{PlacementZoneDirectory, TagRegistry, ZoneEdit, ZoneRef};
pub use transport::{Method, Transport};

#[cfg(any(test, feature = "test-util"))]
pub use transport::InMemoryControlPlane;
