// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource pool documents and derived utilization

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use super::null_as_default;
use crate::errors::{PlacementError, PlacementResult};
use crate::links::ResourceKind;

/// Server-reported free memory in bytes
pub const AVAILABLE_MEMORY_PROPERTY: &str = "__availableMemory";

/// Server-reported CPU usage percentage
pub const CPU_USAGE_PROPERTY: &str = "__cpuUsage";

/// Custom properties of a resource pool
///
/// `Some(value)` sets a property and `None` is sent as JSON `null`, which
/// clears it on PATCH. Keys missing from the map are left untouched.
pub type CustomProperties = BTreeMap<String, Option<String>>;

/// Elastic resource pool backing a placement zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePoolState {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_cpu_count: i64,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_memory_bytes: i64,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub custom_properties: CustomProperties,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_self_link: Option<String>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Round to two decimals, half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ResourcePoolState {
    /// Create a pool with a name and custom properties
    pub fn new(name: impl Into<String>, custom_properties: CustomProperties) -> Self {
        Self {
            name: name.into(),
            custom_properties,
            ..Self::default()
        }
    }

    /// Short ID derived from the self-link
    pub fn id(&self) -> &str {
        self.document_self_link
            .as_deref()
            .map(|link| ResourceKind::PlacementZone.short_id(link))
            .unwrap_or("")
    }

    fn property(&self, key: &str) -> Option<&str> {
        self.custom_properties.get(key).and_then(|v| v.as_deref())
    }

    /// Share of `maxMemoryBytes` in use, formatted as `"NN.NN%"`
    ///
    /// A missing available-memory counter counts as zero bytes free. A counter
    /// that is present but not an integer is corrupt server data and yields
    /// the fatal [`PlacementError::InvalidCounter`].
    pub fn used_memory_percent(&self) -> PlacementResult<String> {
        let max_memory = self.max_memory_bytes;
        let available_memory = match self.property(AVAILABLE_MEMORY_PROPERTY) {
            None => 0,
            Some(raw) => raw.parse::<i64>().map_err(|_| PlacementError::InvalidCounter {
                key: AVAILABLE_MEMORY_PROPERTY.to_string(),
                value: raw.to_string(),
            })?,
        };

        let used_memory = max_memory.saturating_sub(available_memory);
        let percentage = if max_memory == 0 {
            0.0
        } else {
            used_memory as f64 / max_memory as f64 * 100.0
        };

        Ok(format!("{:.2}%", round2(percentage)))
    }

    /// CPU usage formatted as `"NN.NN%"`, or `"0%"` when unknown
    pub fn used_cpu_percent(&self) -> String {
        let Some(raw) = self.property(CPU_USAGE_PROPERTY) else {
            return "0%".to_string();
        };

        match raw.parse::<f64>() {
            Ok(usage) => format!("{:.2}%", round2(usage)),
            Err(_) => {
                warn!("Ignoring unparsable {} value: {}", CPU_USAGE_PROPERTY, raw);
                "0%".to_string()
            }
        }
    }
}

/// Parse `key=value` strings into custom properties
///
/// Splits on the first `=`, so values may themselves contain `=`. Entries
/// without `=` or with an empty key are skipped.
pub fn parse_custom_properties<S: AsRef<str>>(inputs: &[S]) -> CustomProperties {
    let mut properties = CustomProperties::new();
    for input in inputs {
        let input = input.as_ref();
        match input.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                properties.insert(key.to_string(), Some(value.to_string()));
            }
            _ => warn!("Skipping custom property without key=value form: {}", input),
        }
    }
    properties
}
