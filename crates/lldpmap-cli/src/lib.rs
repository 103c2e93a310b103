//! lldpmap command-line interface.
//!
pub mod options;
pub mod output;
pub mod pipeline;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use tracing::info;

use lldpmap_core::{DeviceRegistry, LayoutEngine, MapConfig, StaticLayout};
use lldpmap_dot::GraphvizLayout;
use lldpmap_sync::{MapOutcome, ZabbixMapStore};

pub use options::{ConfigOverrides, ZabbixOptions};
pub use output::WrittenFiles;

/// Options for running lldpmap.
#[derive(Debug, Clone, Default)]
pub struct LldpmapOptions {
    /// Device snapshot (JSON).
    pub devices: PathBuf,
    /// Map configuration (TOML).
    pub config: Option<PathBuf>,
    /// Precomputed positions used instead of running Graphviz.
    pub positions: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    pub zabbix: ZabbixOptions,
    /// Reconcile against an in-memory map even when a Zabbix url is set.
    pub dry_run: bool,
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub nodes: usize,
    pub edges: usize,
    pub files: WrittenFiles,
    /// `None` when publishing is disabled by an empty map name.
    pub outcome: Option<MapOutcome>,
}

/// Effective configuration: file (or defaults), then command-line overrides.
pub fn load_config(opts: &LldpmapOptions) -> anyhow::Result<MapConfig> {
    let mut config = match &opts.config {
        Some(path) => MapConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MapConfig::default(),
    };
    opts.overrides.apply(&mut config);
    config
        .validate()
        .context("invalid configuration after command-line overrides")?;
    Ok(config)
}

/// Main entry point
pub fn run_main(opts: &LldpmapOptions) -> anyhow::Result<RunSummary> {
    let config = load_config(opts)?;

    let load_start = Instant::now();
    let registry = DeviceRegistry::from_json_file(&opts.devices)
        .with_context(|| format!("loading device snapshot {}", opts.devices.display()))?;
    info!(
        "Snapshot: {} devices: {:.2}s",
        registry.len(),
        load_start.elapsed().as_secs_f64()
    );

    let graph = pipeline::build_topology(&config, &registry)?;
    let files = output::write_outputs(&graph, &config).context("writing diagram outputs")?;

    let mut summary = RunSummary {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        files,
        outcome: None,
    };
    if !config.publishes_map() {
        info!("map name is empty, nothing to publish");
        return Ok(summary);
    }

    let engine: Box<dyn LayoutEngine> = match &opts.positions {
        Some(path) => Box::new(
            StaticLayout::from_json_file(path)
                .with_context(|| format!("loading positions {}", path.display()))?,
        ),
        None => Box::new(GraphvizLayout::new(config.layout)),
    };
    let pixels = pipeline::place_nodes(engine.as_ref(), &graph, &config).context("layout")?;

    let connection = opts.zabbix.connection().filter(|_| !opts.dry_run);
    let outcome = match connection {
        Some(connection) => {
            let store = ZabbixMapStore::connect(&connection).context("connecting to zabbix")?;
            info!(endpoint = store.endpoint(), "publishing to zabbix");
            pipeline::publish(&store, &graph, &pixels, &config)
        }
        None => {
            let store = pipeline::dry_run_store(&config);
            let outcome = pipeline::publish(&store, &graph, &pixels, &config);
            if let Some(map) = store.map(&config.map_name) {
                info!(
                    "dry run: map {} would hold {} elements and {} links",
                    map.name,
                    map.elements.len(),
                    map.links.len()
                );
            }
            outcome
        }
    }
    .with_context(|| format!("publishing map {}", config.map_name))?;

    summary.outcome = Some(outcome);
    Ok(summary)
}
