// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tag documents and `key:value` parsing

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::null_as_default;
use crate::errors::{PlacementError, PlacementResult};
use crate::links::ResourceKind;

/// Key/value label attached to other resources
///
/// Two tags are the same tag when their `(key, value)` pairs match exactly;
/// the self-link is only known once the server has stored the tag.
///
/// # Examples
///
/// ```rust
/// use cim_placement::domain::Tag;
///
/// let tag = Tag::parse("env: prod").unwrap();
/// assert_eq!(tag.key, "env");
/// assert_eq!(tag.value, "prod");
///
/// let key_only = Tag::parse("gpu").unwrap();
/// assert_eq!(key_only.value, "");
///
/// assert!(Tag::parse("a:b:c").is_err());
/// assert!(Tag::parse(":x").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_self_link: Option<String>,
}

impl Tag {
    /// Parse a `key` or `key:value` string
    ///
    /// Input without a colon becomes a key-only tag, kept verbatim. Input with
    /// one colon is split and both halves are trimmed. More than one colon, or
    /// a key that is blank, is rejected in either form.
    pub fn parse(input: &str) -> PlacementResult<Self> {
        let (key, value) = match input.split_once(':') {
            None => (input, ""),
            Some((_, value)) if value.contains(':') => {
                return Err(PlacementError::malformed_tag(input))
            }
            Some((key, value)) => (key.trim(), value.trim()),
        };

        if key.trim().is_empty() {
            return Err(PlacementError::malformed_tag(input));
        }

        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
            document_self_link: None,
        })
    }

    /// Short ID assigned by the server, if the tag has been stored
    pub fn id(&self) -> Option<&str> {
        self.document_self_link
            .as_deref()
            .map(|link| ResourceKind::Tag.short_id(link))
            .filter(|id| !id.is_empty())
    }

    /// Whether this tag carries the given key/value pair
    pub fn matches(&self, other: &Tag) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl FromStr for Tag {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.key, self.value)
    }
}

/// Expanded tag listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_links: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: HashMap<String, Tag>,
}

impl TagList {
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// First tag in server order
    pub fn first(&self) -> Option<&Tag> {
        self.document_links
            .iter()
            .find_map(|link| self.documents.get(link))
    }
}
