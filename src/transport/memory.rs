// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-process control plane
//!
//! Serves the tag and placement zone endpoints from memory so the directory
//! can be driven without a server. Every request is recorded, and a failure
//! can be armed for the next request matching a method and path prefix.
//!
//! Compiled for this crate's tests and behind the `test-util` feature.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use super::{Method, Response, Transport};
use crate::domain::{PlacementZone, Tag};
use crate::errors::{PlacementError, PlacementResult};
use crate::links::{self, PLACEMENT_ZONES_CONFIG, RESOURCE_POOLS, TAGS};

/// Collection prefix of stored tag policies
const POLICIES: &str = "/resources/elastic-placement-zones/";

/// A request as the control plane received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct ArmedFailure {
    method: Method,
    path_prefix: String,
    message: String,
}

#[derive(Debug, Default)]
struct State {
    tags: Vec<Tag>,
    zones: Vec<PlacementZone>,
    requests: Vec<RecordedRequest>,
    failures: Vec<ArmedFailure>,
}

/// In-memory implementation of the control plane endpoints
#[derive(Debug, Default)]
pub struct InMemoryControlPlane {
    state: Mutex<State>,
}

fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}

fn ok(status: u16, body: Value) -> PlacementResult<Response> {
    Ok(Response {
        status,
        body: serde_json::to_vec(&body)?,
    })
}

fn rejected(method: Method, path: &str, status: u16, message: impl Into<String>) -> PlacementError {
    PlacementError::Transport {
        method,
        path: path.to_string(),
        status: Some(status),
        message: message.into(),
    }
}

/// Decoded value of `$filter=...` in a query string
fn filter_clause(query: &str) -> Option<&str> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("$filter="))
}

/// Value of a quoted filter literal, with `''` standing for `'`
fn decode_literal(raw: &str) -> Option<String> {
    urlencoding::decode(raw).ok().map(|s| s.replace("''", "'"))
}

/// Key and value of a `key+eq+'k'+and+value+eq+'v'` filter
fn tag_filter_terms(clause: &str) -> Option<(String, String)> {
    let rest = clause.strip_prefix("key+eq+'")?.strip_suffix('\'')?;
    let (key, value) = rest.split_once("'+and+value+eq+'")?;
    Some((decode_literal(key)?, decode_literal(value)?))
}

/// Self-link of a `documentSelfLink+eq+'link'` filter
fn self_link_filter(clause: &str) -> Option<String> {
    let raw = clause
        .strip_prefix("documentSelfLink+eq+'")?
        .strip_suffix('\'')?;
    decode_literal(raw)
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock cannot leave the maps half-written
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a tag and return its self-link
    pub fn seed_tag(&self, key: &str, value: &str) -> String {
        let link = links::tag_link(&new_id());
        self.lock().tags.push(Tag {
            key: key.to_string(),
            value: value.to_string(),
            document_self_link: Some(link.clone()),
        });
        link
    }

    /// Store a zone as-is, assigning a pool self-link when it has none
    pub fn seed_zone(&self, mut zone: PlacementZone) -> String {
        let link = zone
            .resource_pool_state
            .document_self_link
            .clone()
            .unwrap_or_else(|| links::pool_link(&new_id()));
        zone.resource_pool_state.document_self_link = Some(link.clone());
        zone.document_self_link = Some(link.clone());
        self.lock().zones.push(zone);
        link
    }

    /// Snapshot of the stored zones in creation order
    pub fn zones(&self) -> Vec<PlacementZone> {
        self.lock().zones.clone()
    }

    /// Snapshot of the stored tags in creation order
    pub fn tags(&self) -> Vec<Tag> {
        self.lock().tags.clone()
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Fail the next request with this method whose path starts with `path_prefix`
    pub fn fail_next(&self, method: Method, path_prefix: &str, message: &str) {
        self.lock().failures.push(ArmedFailure {
            method,
            path_prefix: path_prefix.to_string(),
            message: message.to_string(),
        });
    }

    fn route(
        state: &mut State,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> PlacementResult<Response> {
        let (base, query) = path.split_once('?').unwrap_or((path, ""));
        let tags_collection = TAGS.trim_end_matches('/');

        match method {
            Method::Get if base == PLACEMENT_ZONES_CONFIG => {
                let wanted = filter_clause(query).and_then(self_link_filter);
                Self::list_zones(state, wanted.as_deref())
            }
            Method::Post if base == PLACEMENT_ZONES_CONFIG => {
                Self::create_zone(state, method, path, body)
            }
            Method::Patch if base.starts_with(PLACEMENT_ZONES_CONFIG) => {
                let pool_link = &base[PLACEMENT_ZONES_CONFIG.len()..];
                Self::update_zone(state, method, path, pool_link, body)
            }
            Method::Delete if base.starts_with(RESOURCE_POOLS) => {
                let before = state.zones.len();
                state.zones.retain(|zone| {
                    zone.resource_pool_state.document_self_link.as_deref() != Some(base)
                });
                if state.zones.len() == before {
                    return Err(rejected(method, path, 404, format!("Service not found: {}", base)));
                }
                ok(200, Value::Null)
            }
            Method::Get if base.starts_with(RESOURCE_POOLS) => state
                .zones
                .iter()
                .find(|zone| zone.resource_pool_state.document_self_link.as_deref() == Some(base))
                .map(|zone| ok(200, serde_json::to_value(&zone.resource_pool_state)?))
                .unwrap_or_else(|| {
                    Err(rejected(method, path, 404, format!("Service not found: {}", base)))
                }),
            Method::Get if base == tags_collection => {
                let wanted = filter_clause(query).and_then(tag_filter_terms);
                Self::list_tags(state, wanted)
            }
            Method::Post if base == tags_collection || base == TAGS => {
                Self::create_tag(state, method, path, body)
            }
            Method::Get if base.starts_with(TAGS) => state
                .tags
                .iter()
                .find(|tag| tag.document_self_link.as_deref() == Some(base))
                .map(|tag| ok(200, serde_json::to_value(tag)?))
                .unwrap_or_else(|| {
                    Err(rejected(method, path, 404, format!("Service not found: {}", base)))
                }),
            _ => Err(rejected(method, path, 404, format!("Service not found: {}", base))),
        }
    }

    fn list_zones(state: &State, self_link: Option<&str>) -> PlacementResult<Response> {
        let mut links = Vec::new();
        let mut documents = serde_json::Map::new();
        for zone in &state.zones {
            let link = zone.document_self_link.clone().unwrap_or_default();
            if self_link.is_some_and(|wanted| wanted != link) {
                continue;
            }
            documents.insert(link.clone(), zone.to_json()?);
            links.push(link);
        }
        ok(
            200,
            json!({"totalCount": links.len(), "documentLinks": links, "documents": documents}),
        )
    }

    fn create_zone(
        state: &mut State,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> PlacementResult<Response> {
        let body = body.ok_or_else(|| rejected(method, path, 400, "missing body"))?;
        let mut zone: PlacementZone = serde_json::from_value(body.clone())
            .map_err(|e| rejected(method, path, 400, e.to_string()))?;

        let id = new_id();
        let pool_link = links::pool_link(&id);
        zone.resource_pool_state.document_self_link = Some(pool_link.clone());
        zone.document_self_link = Some(pool_link.clone());
        if !zone.epz_state.is_empty() {
            zone.epz_state.resource_pool_link = Some(pool_link);
            zone.epz_state.document_self_link = Some(format!("{}{}", POLICIES, id));
        }

        let response = zone.to_json()?;
        state.zones.push(zone);
        ok(200, response)
    }

    fn update_zone(
        state: &mut State,
        method: Method,
        path: &str,
        pool_link: &str,
        body: Option<&Value>,
    ) -> PlacementResult<Response> {
        let body = body.ok_or_else(|| rejected(method, path, 400, "missing body"))?;
        let patch: PlacementZone = serde_json::from_value(body.clone())
            .map_err(|e| rejected(method, path, 400, e.to_string()))?;

        let zone = state
            .zones
            .iter_mut()
            .find(|zone| zone.resource_pool_state.document_self_link.as_deref() == Some(pool_link))
            .ok_or_else(|| rejected(method, path, 404, format!("Service not found: {}", pool_link)))?;

        let pool = &mut zone.resource_pool_state;
        if !patch.resource_pool_state.name.is_empty() {
            pool.name = patch.resource_pool_state.name.clone();
        }
        if patch.resource_pool_state.max_cpu_count != 0 {
            pool.max_cpu_count = patch.resource_pool_state.max_cpu_count;
        }
        if patch.resource_pool_state.max_memory_bytes != 0 {
            pool.max_memory_bytes = patch.resource_pool_state.max_memory_bytes;
        }
        for (key, value) in &patch.resource_pool_state.custom_properties {
            match value {
                Some(_) => {
                    pool.custom_properties.insert(key.clone(), value.clone());
                }
                None => {
                    pool.custom_properties.remove(key);
                }
            }
        }

        if !patch.epz_state.is_empty() {
            let id = links::resource_id(pool_link).to_string();
            let policy = &mut zone.epz_state;
            policy.tag_links_to_match = patch.epz_state.tag_links_to_match.clone();
            policy.resource_pool_link = Some(pool_link.to_string());
            if policy.document_self_link.is_none() {
                policy.document_self_link = Some(format!("{}{}", POLICIES, id));
            }
        }

        let response = zone.to_json()?;
        ok(200, response)
    }

    fn list_tags(state: &State, wanted: Option<(String, String)>) -> PlacementResult<Response> {
        let mut links = Vec::new();
        let mut documents = serde_json::Map::new();
        for tag in &state.tags {
            if let Some((key, value)) = &wanted {
                if &tag.key != key || &tag.value != value {
                    continue;
                }
            }
            let link = tag.document_self_link.clone().unwrap_or_default();
            documents.insert(link.clone(), serde_json::to_value(tag)?);
            links.push(link);
        }
        ok(
            200,
            json!({"totalCount": links.len(), "documentLinks": links, "documents": documents}),
        )
    }

    fn create_tag(
        state: &mut State,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> PlacementResult<Response> {
        let body = body.ok_or_else(|| rejected(method, path, 400, "missing body"))?;
        let mut tag: Tag = serde_json::from_value(body.clone())
            .map_err(|e| rejected(method, path, 400, e.to_string()))?;
        if tag.key.is_empty() {
            return Err(rejected(method, path, 400, "tag key is required"));
        }

        tag.document_self_link = Some(links::tag_link(&new_id()));
        let response = serde_json::to_value(&tag)?;
        state.tags.push(tag);
        ok(200, response)
    }
}

#[async_trait]
impl Transport for InMemoryControlPlane {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> PlacementResult<Response> {
        debug!("{} {} (in-memory)", method, path);

        let body = body
            .map(|bytes| serde_json::from_slice::<Value>(&bytes))
            .transpose()
            .map_err(|e| rejected(method, path, 400, format!("invalid JSON body: {}", e)))?;

        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.clone(),
        });

        if let Some(index) = state
            .failures
            .iter()
            .position(|f| f.method == method && path.starts_with(&f.path_prefix))
        {
            let failure = state.failures.remove(index);
            return Err(rejected(method, path, 500, failure.message));
        }

        Self::route(&mut state, method, path, body.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResourcePoolState, TagList, TagPolicy};
    use crate::transport::decode;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio_test::block_on(future)
    }

    #[test]
    fn test_tag_filter_terms() {
        assert_eq!(
            tag_filter_terms("key+eq+'env'+and+value+eq+'prod%20east'"),
            Some(("env".to_string(), "prod east".to_string()))
        );
        assert_eq!(
            tag_filter_terms("key+eq+'gpu'+and+value+eq+''"),
            Some(("gpu".to_string(), String::new()))
        );
        assert_eq!(
            tag_filter_terms("key+eq+'owner'+and+value+eq+'o%27%27brien'"),
            Some(("owner".to_string(), "o'brien".to_string()))
        );
        assert_eq!(tag_filter_terms("name+eq+'x'"), None);
    }

    #[test]
    fn test_tag_filter_matches_exact_pair() {
        let plane = InMemoryControlPlane::new();
        let prod = plane.seed_tag("env", "prod");
        plane.seed_tag("env", "dev");

        let response = block_on(plane.send(Method::Get, &links::tag_filter("env", "prod"), None))
            .unwrap();
        let list: TagList = decode(&response.body, "tag listing").unwrap();

        assert_eq!(list.count(), 1);
        assert_eq!(list.first().and_then(|t| t.document_self_link.clone()), Some(prod));
    }

    #[test]
    fn test_zone_lifecycle() {
        let plane = InMemoryControlPlane::new();
        let zone = PlacementZone::new(
            ResourcePoolState::new("zone1", Default::default()),
            TagPolicy::default(),
        );

        let created =
            block_on(plane.send(Method::Post, PLACEMENT_ZONES_CONFIG, Some(zone.encode().unwrap())))
                .unwrap();
        let created: PlacementZone = decode(&created.body, "placement zone").unwrap();
        let pool_link = created.resource_pool_state.document_self_link.clone().unwrap();
        assert!(created.epz_state.is_empty());

        block_on(plane.send(Method::Delete, &pool_link, None)).unwrap();
        assert!(plane.zones().is_empty());

        let err = block_on(plane.send(Method::Delete, &pool_link, None)).unwrap_err();
        assert!(matches!(err, PlacementError::Transport { status: Some(404), .. }));
    }

    #[test]
    fn test_armed_failure_fires_once() {
        let plane = InMemoryControlPlane::new();
        plane.fail_next(Method::Get, "/resources/tags", "connection reset");

        let path = links::tag_filter("env", "prod");
        let err = block_on(plane.send(Method::Get, &path, None)).unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert!(!err.is_fatal());

        assert!(block_on(plane.send(Method::Get, &path, None)).is_ok());
        assert_eq!(plane.requests().len(), 2);
    }
}
