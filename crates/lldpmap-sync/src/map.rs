//! The map as the remote side stores it.

use std::fmt;

use lldpmap_core::MapConfig;
use serde::{Deserialize, Serialize};

/// Identifier the remote system assigned to a map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One placed host. `ordinal` is the element id links refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapElement {
    pub ordinal: u32,
    pub host_id: String,
    pub x: i64,
    pub y: i64,
    pub icon_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapLink {
    pub from: u32,
    pub to: u32,
    /// Hex RGB without a leading `#`, uppercase.
    pub color: Option<String>,
}

/// Desired state of a remote map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub elements: Vec<MapElement>,
    pub links: Vec<MapLink>,
}

impl MapSpec {
    /// A map with the same identity and no content.
    pub fn cleared(&self) -> Self {
        Self {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            elements: Vec::new(),
            links: Vec::new(),
        }
    }
}

/// What to publish, independent of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRequest {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Icon name used for nodes without a configured icon.
    pub default_icon: String,
}

impl MapRequest {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            name: config.map_name.clone(),
            width: config.width,
            height: config.height,
            default_icon: config.default_icon.clone(),
        }
    }
}

/// Normalize a Graphviz-style color to the remote format.
pub fn link_color(color: &str) -> Option<String> {
    let hex = color.trim().trim_start_matches('#');
    if hex.is_empty() {
        None
    } else {
        Some(hex.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_link_color() {
        assert_eq!(link_color("#00cc00").as_deref(), Some("00CC00"));
        assert_eq!(link_color("ff0000").as_deref(), Some("FF0000"));
        assert_eq!(link_color(" # "), None);
    }

    #[test]
    fn test_request_from_config() {
        let config = MapConfig {
            map_name: "Campus".into(),
            ..Default::default()
        };
        let request = MapRequest::from_config(&config);
        assert_eq!(request.name, "Campus");
        assert_eq!((request.width, request.height), (1280, 720));
        assert_eq!(request.default_icon, "Switch_(48)");
    }
}
