//! Command-line option groups.
//!
//! Every option here overrides a value that would otherwise come from the
//! config file (or its built-in default).

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use lldpmap_core::{LayoutProgram, MapConfig};
use lldpmap_sync::ZabbixConfig;

/// Overrides for [`MapConfig`] values.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Name of the published map; an empty name disables publishing.
    #[arg(long = "map-name", value_name = "NAME")]
    pub map_name: Option<String>,

    /// Canvas width in pixels.
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Canvas height in pixels.
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Graphviz layout program: dot, neato, twopi, circo, fdp or sfdp.
    #[arg(long, value_name = "PROGRAM")]
    pub layout: Option<LayoutProgram>,

    /// Write the topology as a Graphviz DOT file.
    #[arg(long = "dot-file", value_name = "FILE")]
    pub dot_file: Option<PathBuf>,

    /// Render the topology to an image; the format follows the extension.
    #[arg(long = "image-file", value_name = "FILE")]
    pub image_file: Option<PathBuf>,

    /// Directory holding `<icon>.png` files for the diagram.
    #[arg(long = "icon-dir", value_name = "DIR")]
    pub icon_dir: Option<PathBuf>,

    /// Leave port names off the links.
    #[arg(long = "no-port-labels")]
    pub no_port_labels: bool,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map_name(mut self, name: impl Into<String>) -> Self {
        self.map_name = Some(name.into());
        self
    }

    pub fn with_dot_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dot_file = Some(path.into());
        self
    }

    pub fn apply(&self, config: &mut MapConfig) {
        if let Some(name) = &self.map_name {
            config.map_name.clone_from(name);
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if self.dot_file.is_some() {
            config.dot_file.clone_from(&self.dot_file);
        }
        if self.image_file.is_some() {
            config.image_file.clone_from(&self.image_file);
        }
        if self.icon_dir.is_some() {
            config.icon_dir.clone_from(&self.icon_dir);
        }
        if self.no_port_labels {
            config.port_labels = false;
        }
    }
}

/// Connection to the Zabbix API.
#[derive(Args, Debug, Clone, Default)]
pub struct ZabbixOptions {
    /// Zabbix frontend url; without it the map is only reconciled in memory.
    #[arg(long = "zabbix-url", env = "ZABBIX_URL", value_name = "URL")]
    pub url: Option<String>,

    /// Zabbix API token.
    #[arg(
        long = "zabbix-token",
        env = "ZABBIX_API_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Accept invalid TLS certificates.
    #[arg(long, env = "ZABBIX_INSECURE")]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[arg(long = "zabbix-timeout", value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl ZabbixOptions {
    /// The connection settings, if a url was given.
    pub fn connection(&self) -> Option<ZabbixConfig> {
        let url = self.url.as_deref().filter(|url| !url.trim().is_empty())?;
        Some(
            ZabbixConfig::new(url, self.token.clone().unwrap_or_default())
                .insecure(self.insecure)
                .timeout(Duration::from_secs(self.timeout_secs)),
        )
    }
}
