//! Run phases: snapshot → topology → layout → pixels → publish.

use std::time::Instant;

use tracing::info;

use lldpmap_core::{
    CoordinateMapper, DeviceRegistry, Graph, LayoutEngine, MapConfig, PixelLayout, Result,
    TopologyBuilder,
};
use lldpmap_sync::{MapOutcome, MapReconciler, MapRequest, MapStore, MemoryMapStore};

/// Build the deduplicated topology for `registry`.
pub fn build_topology(config: &MapConfig, registry: &DeviceRegistry) -> Result<Graph> {
    let start = Instant::now();
    let (graph, stats) = TopologyBuilder::new(config)?.build_with_stats(registry);
    info!(
        "Topology: {} devices, {} nodes, {} edges ({} observations, {} merged, {} dropped): {:.2}s",
        stats.devices,
        graph.node_count(),
        graph.edge_count(),
        stats.observations,
        stats.merged,
        stats.dropped,
        start.elapsed().as_secs_f64()
    );
    Ok(graph)
}

/// Lay out `graph` and map the result onto the configured canvas.
pub fn place_nodes(
    engine: &dyn LayoutEngine,
    graph: &Graph,
    config: &MapConfig,
) -> Result<PixelLayout> {
    let start = Instant::now();
    let raw = engine.layout(graph, config.canvas())?;
    let pixels = CoordinateMapper::new(config.canvas()).map(&raw);
    info!(
        "Layout: {}/{} nodes placed: {:.2}s",
        pixels.len(),
        graph.node_count(),
        start.elapsed().as_secs_f64()
    );
    Ok(pixels)
}

/// Replace the remote map with the current topology.
pub fn publish(
    store: &dyn MapStore,
    graph: &Graph,
    pixels: &PixelLayout,
    config: &MapConfig,
) -> Result<MapOutcome> {
    MapReconciler::new(store).publish(graph, pixels, &MapRequest::from_config(config))
}

/// In-memory store for dry runs, with every configured icon resolvable
/// under its own name.
pub fn dry_run_store(config: &MapConfig) -> MemoryMapStore {
    let icons = std::iter::once(config.default_icon.clone())
        .chain(config.icons.values().cloned())
        .map(|name| (name.clone(), name));
    MemoryMapStore::new().with_icons(icons)
}
