// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tag Policy of a Placement Zone
//!
//! A placement zone may restrict the resources it admits to those carrying a
//! set of tags. The policy stores the self-links of those tags in first-seen
//! order without duplicates.
//!
//! # Empty policies
//!
//! The server tells "no policy" apart from "a policy matching zero tags". A
//! policy with no tag links and neither self-link set is therefore sent as
//! JSON `null`. The decision ([`TagPolicy::is_empty`]) and the encoding
//! ([`TagPolicy::to_wire`] / [`TagPolicy::to_json`]) are kept separate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{link_is_set, null_as_default};
use crate::errors::PlacementResult;
use crate::links;

/// Resolves `key:value` input to the short ID of a stored tag
#[async_trait]
pub trait TagLookup: Send + Sync {
    /// Find the tag matching `input` exactly, creating it when asked to
    ///
    /// Returns `Ok(None)` when no tag matches and `create_if_missing` is false.
    async fn resolve_tag_id(
        &self,
        input: &str,
        create_if_missing: bool,
    ) -> PlacementResult<Option<String>>;
}

/// Tag matching rule attached to a placement zone (EPZ state)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_pool_link: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tag_links_to_match: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_self_link: Option<String>,
}

impl TagPolicy {
    /// True when no tag links are set and neither self-link is set
    pub fn is_empty(&self) -> bool {
        self.tag_links_to_match.is_empty()
            && !link_is_set(&self.resource_pool_link)
            && !link_is_set(&self.document_self_link)
    }

    /// The policy as it goes on the wire: `None` when empty
    pub fn to_wire(&self) -> Option<&TagPolicy> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// JSON encoding of the policy, `null` when empty
    pub fn to_json(&self) -> serde_json::Value {
        match self.to_wire() {
            // Plain strings and optional strings always serialize
            Some(policy) => serde_json::to_value(policy).unwrap_or(serde_json::Value::Null),
            None => serde_json::Value::Null,
        }
    }

    pub fn contains_tag_link(&self, link: &str) -> bool {
        self.tag_links_to_match.iter().any(|l| l == link)
    }

    /// Append a link unless it is already present. Returns whether it was added.
    pub fn insert_tag_link(&mut self, link: String) -> bool {
        if link.is_empty() || self.contains_tag_link(&link) {
            return false;
        }
        self.tag_links_to_match.push(link);
        true
    }

    /// Drop every occurrence of a link. Returns how many were removed.
    pub fn remove_tag_link(&mut self, link: &str) -> usize {
        let before = self.tag_links_to_match.len();
        self.tag_links_to_match.retain(|l| l != link);
        before - self.tag_links_to_match.len()
    }

    /// Resolve or create each input tag and add its link
    ///
    /// Stops at the first failing input; links added before it are kept.
    pub async fn add_tags<L, S>(&mut self, tags: &L, inputs: &[S]) -> PlacementResult<()>
    where
        L: TagLookup + ?Sized,
        S: AsRef<str> + Sync,
    {
        for input in inputs {
            if let Some(id) = tags.resolve_tag_id(input.as_ref(), true).await? {
                self.insert_tag_link(links::tag_link(&id));
            }
        }
        Ok(())
    }

    /// Resolve each input tag and remove every occurrence of its link
    ///
    /// Inputs matching no stored tag are ignored. All inputs are resolved
    /// before anything is removed, so a failing input leaves the policy as it was.
    pub async fn remove_tags<L, S>(&mut self, tags: &L, inputs: &[S]) -> PlacementResult<()>
    where
        L: TagLookup + ?Sized,
        S: AsRef<str> + Sync,
    {
        let mut to_remove = Vec::with_capacity(inputs.len());
        for input in inputs {
            if let Some(id) = tags.resolve_tag_id(input.as_ref(), false).await? {
                to_remove.push(links::tag_link(&id));
            }
        }

        for link in &to_remove {
            self.remove_tag_link(link);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Tag;
    use crate::errors::PlacementError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Lookup over a fixed key/value → id table that can "create" new ids
    #[derive(Default)]
    struct FakeTags {
        known: Mutex<HashMap<(String, String), String>>,
    }

    impl FakeTags {
        fn with(entries: &[(&str, &str)]) -> Self {
            let fake = Self::default();
            for (input, id) in entries {
                let tag = Tag::parse(input).unwrap();
                fake.known
                    .lock()
                    .unwrap()
                    .insert((tag.key, tag.value), id.to_string());
            }
            fake
        }
    }

    #[async_trait]
    impl TagLookup for FakeTags {
        async fn resolve_tag_id(
            &self,
            input: &str,
            create_if_missing: bool,
        ) -> PlacementResult<Option<String>> {
            let tag = Tag::parse(input)?;
            let mut known = self.known.lock().unwrap();
            let next_id = format!("t{}", known.len() + 1);
            let key = (tag.key, tag.value);
            match known.get(&key) {
                Some(id) => Ok(Some(id.clone())),
                None if create_if_missing => {
                    known.insert(key, next_id.clone());
                    Ok(Some(next_id))
                }
                None => Ok(None),
            }
        }
    }

    fn tag_links(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| links::tag_link(id)).collect()
    }

    #[test]
    fn test_is_empty() {
        assert!(TagPolicy::default().is_empty());

        let with_tag = TagPolicy {
            tag_links_to_match: tag_links(&["t1"]),
            ..TagPolicy::default()
        };
        assert!(!with_tag.is_empty());

        let with_pool = TagPolicy {
            resource_pool_link: Some("/resources/pools/p1".to_string()),
            ..TagPolicy::default()
        };
        assert!(!with_pool.is_empty());

        let blank_links = TagPolicy {
            resource_pool_link: Some(String::new()),
            document_self_link: Some(String::new()),
            ..TagPolicy::default()
        };
        assert!(blank_links.is_empty());
    }

    #[test]
    fn test_empty_policy_encodes_as_null() {
        let policy = TagPolicy::default();
        assert_eq!(policy.to_wire(), None);
        assert_eq!(policy.to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_policy_with_links_keeps_empty_tag_list() {
        let policy = TagPolicy {
            resource_pool_link: Some("/resources/pools/p1".to_string()),
            document_self_link: Some("/resources/elastic-placement-zones/z1".to_string()),
            tag_links_to_match: Vec::new(),
        };
        assert_eq!(
            policy.to_json(),
            serde_json::json!({
                "resourcePoolLink": "/resources/pools/p1",
                "tagLinksToMatch": [],
                "documentSelfLink": "/resources/elastic-placement-zones/z1"
            })
        );
    }

    #[test]
    fn test_insert_and_remove_links() {
        let mut policy = TagPolicy::default();
        assert!(policy.insert_tag_link(links::tag_link("a")));
        assert!(!policy.insert_tag_link(links::tag_link("a")));
        assert!(!policy.insert_tag_link(String::new()));

        policy.tag_links_to_match.push(links::tag_link("a"));
        assert_eq!(policy.remove_tag_link(&links::tag_link("a")), 2);
        assert!(policy.is_empty());
    }

    #[tokio::test]
    async fn test_add_tags_is_idempotent_and_ordered() {
        let tags = FakeTags::with(&[("env:prod", "t-env")]);
        let mut policy = TagPolicy::default();

        policy
            .add_tags(&tags, &["team:infra", "env:prod", "team:infra"])
            .await
            .unwrap();
        policy.add_tags(&tags, &["env:prod"]).await.unwrap();

        assert_eq!(policy.tag_links_to_match, tag_links(&["t2", "t-env"]));
    }

    #[tokio::test]
    async fn test_add_tags_keeps_partial_progress_on_error() {
        let tags = FakeTags::default();
        let mut policy = TagPolicy::default();

        let err = policy
            .add_tags(&tags, &["env:prod", "a:b:c", "team:infra"])
            .await
            .unwrap_err();

        assert!(matches!(err, PlacementError::MalformedTag { .. }));
        assert_eq!(policy.tag_links_to_match, tag_links(&["t1"]));
    }

    #[tokio::test]
    async fn test_remove_after_add_empties_policy() {
        let tags = FakeTags::default();
        let inputs = ["env:prod", "team:infra"];
        let mut policy = TagPolicy::default();

        policy.add_tags(&tags, &inputs).await.unwrap();
        assert_eq!(policy.tag_links_to_match.len(), 2);

        policy.remove_tags(&tags, &inputs).await.unwrap();
        assert!(policy.tag_links_to_match.is_empty());
        assert_eq!(policy.to_json(), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_remove_unknown_tag_is_noop() {
        let tags = FakeTags::with(&[("env:prod", "t-env")]);
        let mut policy = TagPolicy {
            tag_links_to_match: tag_links(&["t-env"]),
            ..TagPolicy::default()
        };

        policy.remove_tags(&tags, &["env:dev"]).await.unwrap();
        assert_eq!(policy.tag_links_to_match, tag_links(&["t-env"]));
        assert_eq!(tags.known.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_decode_null_tag_links() {
        let policy: TagPolicy = serde_json::from_str(
            r#"{"resourcePoolLink":"/resources/pools/p1","tagLinksToMatch":null}"#,
        )
        .unwrap();
        assert!(policy.tag_links_to_match.is_empty());
        assert!(!policy.is_empty());
    }
}
