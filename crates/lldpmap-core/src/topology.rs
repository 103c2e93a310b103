//! Topology assembly from per-device LLDP neighbor tables.
//!
//! Discovery is asymmetric: a link may be reported by one side, by both, or
//! point at a device that is not monitored at all. The builder keeps only
//! links between known nodes and collapses the two reports of a
//! bidirectionally discovered link into a single edge.

use std::time::Instant;

use tracing::{debug, info, warn};

use lldpmap_error::Result;

use crate::config::MapConfig;
use crate::graph::{Edge, Graph, Node};
use crate::label::LabelTemplate;
use crate::registry::{Device, DeviceRegistry, NeighborObservation};

/// `lldpRemPortIdSubtype` value `local(7)`: the port id is an opaque local
/// identifier (usually an ifIndex), so the port description is shown instead.
pub const PORT_ID_SUBTYPE_LOCAL: i64 = 7;

const BITS_PER_MEGABIT: u64 = 1_000_000;

/// Why an observation did not become (part of) an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NoRemoteName,
    UnknownRemote,
    SelfLoop,
}

/// Counters reported after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub devices: usize,
    pub unidentified: usize,
    pub duplicate_names: usize,
    pub observations: usize,
    pub merged: usize,
    pub dropped: usize,
}

/// Speed bucket in Mbit/s for a reported bits/s value.
pub fn speed_bucket(bits_per_second: u64) -> u64 {
    bits_per_second / BITS_PER_MEGABIT
}

/// Label for the remote port of an observation.
pub fn remote_port_label(obs: &NeighborObservation) -> String {
    if obs.remote_port_subtype == Some(PORT_ID_SUBTYPE_LOCAL)
        && let Some(desc) = obs.remote_port_description.as_deref()
        && !desc.trim().is_empty()
    {
        return desc.to_string();
    }
    obs.remote_port_id.clone()
}

pub struct TopologyBuilder<'a> {
    config: &'a MapConfig,
    template: LabelTemplate,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(config: &'a MapConfig) -> Result<Self> {
        let template = LabelTemplate::parse(&config.label_template)
            .map_err(|err| err.with_operation("topology::new"))?;
        Ok(Self { config, template })
    }

    pub fn build(&self, registry: &DeviceRegistry) -> Graph {
        self.build_with_stats(registry).0
    }

    pub fn build_with_stats(&self, registry: &DeviceRegistry) -> (Graph, BuildStats) {
        let start = Instant::now();
        let mut graph = Graph::new();
        let mut stats = BuildStats {
            devices: registry.len(),
            ..Default::default()
        };

        // Devices that became nodes, with their key. Used for the edge pass so
        // a device that lost a duplicate-name race contributes no edges.
        let mut sources: Vec<(&str, &Device)> = Vec::new();

        for device in registry.iter() {
            let Some(key) = device.system_name() else {
                debug!(device = %device.id(), name = device.name(), "no system name, skipped");
                stats.unidentified += 1;
                continue;
            };
            if graph.add_node(self.make_node(key, device)) {
                sources.push((key, device));
            } else {
                warn!(
                    device = %device.id(),
                    system_name = key,
                    "system name already used by another device, skipped"
                );
                stats.duplicate_names += 1;
            }
        }

        for (local, device) in sources {
            for (local_port, obs) in device.neighbors() {
                stats.observations += 1;
                match self.apply_observation(&mut graph, local, obs) {
                    Ok(true) => stats.merged += 1,
                    Ok(false) => {}
                    Err(reason) => {
                        debug!(
                            device = local,
                            port = local_port.as_str(),
                            remote = obs.remote_system_name.as_deref().unwrap_or(""),
                            ?reason,
                            "neighbor observation dropped"
                        );
                        stats.dropped += 1;
                    }
                }
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            merged = stats.merged,
            dropped = stats.dropped,
            "Topology build: {:.3}s",
            start.elapsed().as_secs_f64()
        );
        (graph, stats)
    }

    fn make_node(&self, key: &str, device: &Device) -> Node {
        Node {
            key: key.to_string(),
            external_id: device.id().clone(),
            label: self.template.render(device.name(), device.inventory()),
            icon: self.config.icon_for(device.inventory()).map(str::to_string),
        }
    }

    /// Fold one observation into the graph. `Ok(true)` means it merged into
    /// an edge reported earlier.
    fn apply_observation(
        &self,
        graph: &mut Graph,
        local: &str,
        obs: &NeighborObservation,
    ) -> std::result::Result<bool, Rejection> {
        let remote = obs.remote_name().ok_or(Rejection::NoRemoteName)?;
        if remote == local {
            return Err(Rejection::SelfLoop);
        }
        if !graph.contains_node(remote) {
            return Err(Rejection::UnknownRemote);
        }

        let reported_speed = obs.speed_bits().map(speed_bucket);
        let speed = reported_speed.unwrap_or(0);
        let style = self.config.style_for(speed);
        let port_label = self.config.port_labels.then(|| remote_port_label(obs));

        if let Some(edge) = graph.edge_between_mut(local, remote) {
            // The style follows the speed bucket it was looked up for.
            if let Some(speed) = reported_speed {
                edge.speed = speed;
                edge.style = style;
            }
            if let Some(label) = port_label {
                edge.set_port_label(remote, label);
            }
            return Ok(true);
        }

        let mut edge = Edge {
            tail: local.to_string(),
            head: remote.to_string(),
            speed,
            style,
            head_label: None,
            tail_label: None,
        };
        if let Some(label) = port_label {
            edge.set_port_label(remote, label);
        }
        graph.add_edge(edge);
        Ok(false)
    }
}
