//! Bring a remote map in line with the computed topology.
//!
//! The remote map is replaced wholesale: an existing map with the requested
//! name is cleared and then rewritten, otherwise a new one is created. The
//! final state only depends on the inputs, but the two steps of an update
//! are not atomic. A failure between them leaves the map empty until the
//! next successful run.

use std::time::Instant;

use lldpmap_core::{Graph, PixelLayout};
use lldpmap_error::Result;
use tracing::{info, warn};

use crate::map::{MapElement, MapId, MapLink, MapRequest, MapSpec, link_color};
use crate::store::{IconCatalog, MapStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome {
    Created(MapId),
    Updated(MapId),
}

impl MapOutcome {
    pub fn id(&self) -> &MapId {
        match self {
            MapOutcome::Created(id) | MapOutcome::Updated(id) => id,
        }
    }
}

pub struct MapReconciler<'a, S: MapStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: MapStore + ?Sized> MapReconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Publish `graph` at the given positions. Any store error aborts.
    pub fn publish(
        &self,
        graph: &Graph,
        pixels: &PixelLayout,
        request: &MapRequest,
    ) -> Result<MapOutcome> {
        let start = Instant::now();
        let icons = self.store.icon_catalog()?;
        let spec = desired_map(graph, pixels, request, &icons);

        let outcome = match self.store.find_map(&request.name)? {
            Some(id) => {
                info!("updating map {} ({})", request.name, id);
                self.store.clear_map(&id)?;
                self.store.update_map(&id, &spec)?;
                MapOutcome::Updated(id)
            }
            None => {
                info!("creating map {}", request.name);
                MapOutcome::Created(self.store.create_map(&spec)?)
            }
        };

        info!(
            "published {} elements and {} links in {:.2}s",
            spec.elements.len(),
            spec.links.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }
}

/// The map `graph` should become.
///
/// Elements follow node order and links follow edge order. A node without a
/// position is left off the map, together with every link touching it.
pub fn desired_map(
    graph: &Graph,
    pixels: &PixelLayout,
    request: &MapRequest,
    icons: &IconCatalog,
) -> MapSpec {
    let ordinals = graph.ordinals();

    let mut elements = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let (Some(ordinal), Some(pixel)) = (ordinals.get(&node.key), pixels.get(&node.key)) else {
            warn!(
                node = node.key.as_str(),
                links = graph.edges_of(&node.key).count(),
                "no layout position, left off the map with its links"
            );
            continue;
        };
        let icon = node.icon.as_deref().unwrap_or(&request.default_icon);
        let icon_id = icons.get(icon).cloned();
        if icon_id.is_none() {
            warn!(node = node.key.as_str(), icon, "icon not found in catalog");
        }
        elements.push(MapElement {
            ordinal,
            host_id: node.external_id.as_str().to_string(),
            x: pixel.x,
            y: pixel.y,
            icon_id,
        });
    }

    let links = graph
        .edges()
        .iter()
        .filter(|edge| pixels.contains_key(&edge.tail) && pixels.contains_key(&edge.head))
        .filter_map(|edge| {
            Some(MapLink {
                from: ordinals.get(&edge.tail)?,
                to: ordinals.get(&edge.head)?,
                color: edge.style.color.as_deref().and_then(link_color),
            })
        })
        .collect();

    MapSpec {
        name: request.name.clone(),
        width: request.width,
        height: request.height,
        elements,
        links,
    }
}
