// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Placement Management
//!
//! Orchestrates identity resolution, fetches of current server state and
//! submission of changes. Domain rules live in [`crate::domain`]; every round
//! trip goes through a [`Transport`](crate::transport::Transport).
//!
//! # Architecture
//!
//! ```text
//! CLI command
//!     ↓
//! PlacementZoneDirectory ──→ IdResolver (short ID → full ID)
//!     ↓
//! TagRegistry (find or create tags)
//!     ↓
//! Transport (HTTP or in-memory)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cim_placement::config::ControlPlaneConfig;
//! use cim_placement::service::{PlacementZoneDirectory, ZoneEdit, ZoneRef};
//! use cim_placement::transport::HttpTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(HttpTransport::new(ControlPlaneConfig::from_env()?)?);
//!     let mut directory = PlacementZoneDirectory::with_listing_resolver(transport);
//!
//!     let id = directory.add("zone1", &["owner=ops"], &["env:prod"]).await?;
//!
//!     let changes = ZoneEdit {
//!         tags_to_add: vec!["team:infra".to_string()],
//!         tags_to_remove: vec!["env:prod".to_string()],
//!         ..ZoneEdit::default()
//!     };
//!     directory.edit(&ZoneRef::Id(id), &changes).await?;
//!
//!     directory.list().await?;
//!     println!("{}", directory.render().await?);
//!
//!     Ok(())
//! }
//! ```

pub mod placement_zones;
pub mod tags;

pub use placement_zones::{
    PlacementZoneDirectory, ZoneEdit, ZoneRef, LISTING_HEADER, NO_ELEMENTS_FOUND,
};
pub use tags::{TagRegistry, NO_TAGS};
