//! Run configuration.
//!
//! Everything a run needs is resolved into one immutable [`MapConfig`] at
//! startup (TOML file first, CLI flags on top) and passed by reference into
//! each stage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lldpmap_error::{Error, Result};

use crate::coords::Canvas;
use crate::graph::EdgeStyle;
use crate::label::LabelTemplate;
use crate::layout::LayoutProgram;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
pub const DEFAULT_MAP_NAME: &str = "LLDP Devices";
pub const DEFAULT_ICON: &str = "Switch_(48)";
pub const DEFAULT_LABEL_TEMPLATE: &str = "${name}\n${model}";

/// Visual attributes applied to links of one speed bucket (Mbit/s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedStyle {
    pub speed: u64,
    #[serde(flatten)]
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Name of the remote map. Empty disables publishing.
    pub map_name: String,
    /// Graphviz program used for layout and image rendering.
    pub layout: LayoutProgram,
    /// Icon used for nodes without a type-specific icon.
    pub default_icon: String,
    /// Inventory attribute whose value selects an entry in `icons`.
    pub icon_attribute: String,
    /// Inventory attribute value -> icon name.
    pub icons: BTreeMap<String, String>,
    /// Directory holding `<icon>.png` files for the static diagram.
    pub icon_dir: Option<PathBuf>,
    /// Node label template, see [`LabelTemplate`].
    pub label_template: String,
    /// Emit remote port labels on edges.
    pub port_labels: bool,
    /// Where to write the DOT diagram.
    pub dot_file: Option<PathBuf>,
    /// Where to write the rendered image.
    pub image_file: Option<PathBuf>,
    pub speed_styles: Vec<SpeedStyle>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            map_name: DEFAULT_MAP_NAME.to_string(),
            layout: LayoutProgram::default(),
            default_icon: DEFAULT_ICON.to_string(),
            icon_attribute: "type".to_string(),
            icons: BTreeMap::new(),
            icon_dir: None,
            label_template: DEFAULT_LABEL_TEMPLATE.to_string(),
            port_labels: true,
            dot_file: None,
            image_file: None,
            speed_styles: Vec::new(),
        }
    }
}

impl MapConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: MapConfig = toml::from_str(text).map_err(|err| {
            Error::config_invalid(err.message().to_string())
                .with_operation("config::from_toml_str")
                .set_source(err)
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::read_failed(path.display().to_string(), err).with_operation("config::from_path")
        })?;
        Self::from_toml_str(&text).map_err(|err| err.with_context("path", path.display().to_string()))
    }

    /// Reject values no stage could work with.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::config_invalid(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            ))
            .with_operation("config::validate"));
        }
        LabelTemplate::parse(&self.label_template)
            .map_err(|err| err.with_operation("config::validate"))?;
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Whether a remote map should be published at all.
    pub fn publishes_map(&self) -> bool {
        !self.map_name.trim().is_empty()
    }

    /// Style for a speed bucket; a bucket without an entry gets an empty style.
    /// When a bucket is listed twice the later entry wins.
    pub fn style_for(&self, speed: u64) -> EdgeStyle {
        self.speed_styles
            .iter()
            .rev()
            .find(|entry| entry.speed == speed)
            .map(|entry| entry.style.clone())
            .unwrap_or_default()
    }

    /// Icon configured for a device's inventory, if any.
    pub fn icon_for(&self, inventory: &BTreeMap<String, String>) -> Option<&str> {
        inventory
            .get(&self.icon_attribute)
            .and_then(|value| self.icons.get(value))
            .map(String::as_str)
    }
}
