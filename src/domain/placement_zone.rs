// Copyright (c) 2025 - Cowboy AI, Inc.
//! Placement zone documents and listings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{null_as_default, ResourcePoolState, TagPolicy};
use crate::errors::PlacementResult;
use crate::links::ResourceKind;

/// A resource pool together with its optional tag policy
///
/// Identified by the pool's self-link. Decoding accepts `epzState: null`;
/// encoding goes through [`PlacementZone::encode`], which writes an empty
/// policy as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementZone {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_pool_state: ResourcePoolState,

    #[serde(default, deserialize_with = "null_as_default")]
    pub epz_state: TagPolicy,

    #[serde(default)]
    pub document_self_link: Option<String>,
}

/// Borrowed wire form of a [`PlacementZone`]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlacementZoneBody<'a> {
    resource_pool_state: &'a ResourcePoolState,
    epz_state: Option<&'a TagPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_self_link: Option<&'a str>,
}

impl PlacementZone {
    /// A zone that has not been stored yet
    pub fn new(resource_pool_state: ResourcePoolState, epz_state: TagPolicy) -> Self {
        Self {
            resource_pool_state,
            epz_state,
            document_self_link: None,
        }
    }

    /// Short ID of the zone, taken from its pool
    pub fn id(&self) -> &str {
        self.resource_pool_state.id()
    }

    pub fn name(&self) -> &str {
        &self.resource_pool_state.name
    }

    fn body(&self) -> PlacementZoneBody<'_> {
        PlacementZoneBody {
            resource_pool_state: &self.resource_pool_state,
            epz_state: self.epz_state.to_wire(),
            document_self_link: self
                .document_self_link
                .as_deref()
                .filter(|link| !link.is_empty()),
        }
    }

    /// JSON value sent to the control plane
    pub fn to_json(&self) -> PlacementResult<serde_json::Value> {
        Ok(serde_json::to_value(self.body())?)
    }

    /// Request body sent to the control plane
    pub fn encode(&self) -> PlacementResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.body())?)
    }
}

/// Expanded placement zone listing, keyed by self-link
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementZoneList {
    #[serde(default)]
    pub total_count: i32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: HashMap<String, PlacementZone>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub document_links: Vec<String>,
}

impl PlacementZoneList {
    /// Number of zones in server order
    pub fn count(&self) -> usize {
        self.document_links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_links.is_empty()
    }

    /// Zones with their self-links, in the order the server returned them
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlacementZone)> + '_ {
        self.document_links
            .iter()
            .filter_map(|link| self.documents.get(link).map(|zone| (link.as_str(), zone)))
    }

    pub fn get(&self, link: &str) -> Option<&PlacementZone> {
        self.documents.get(link)
    }

    /// First zone in server order
    pub fn first(&self) -> Option<&PlacementZone> {
        self.iter().next().map(|(_, zone)| zone)
    }

    /// Self-links of every zone whose pool carries exactly this name
    pub fn links_named(&self, name: &str) -> Vec<String> {
        self.iter()
            .filter(|(_, zone)| zone.name() == name)
            .map(|(link, _)| link.to_string())
            .collect()
    }

    /// Short IDs of every zone, in server order
    pub fn ids(&self) -> Vec<&str> {
        self.document_links
            .iter()
            .map(|link| ResourceKind::PlacementZone.short_id(link))
            .collect()
    }
}
