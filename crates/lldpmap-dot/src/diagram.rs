//! Static topology diagram.
//!
//! Nodes are keyed by system name and carry only presentation attributes;
//! the external host id and the ordinal stay out of the document.

use std::path::PathBuf;

use lldpmap_core::{Edge, Graph, MapConfig, Node};
use tracing::debug;

use crate::dot::DotBuilder;

const GRAPH_NAME: &str = "lldp";

/// Icon image for `node` under the configured `icon_dir`, if the file exists.
pub fn icon_path(node: &Node, config: &MapConfig) -> Option<PathBuf> {
    let dir = config.icon_dir.as_ref()?;
    let icon = node.icon.as_deref().unwrap_or(&config.default_icon);
    let path = dir.join(format!("{icon}.png"));
    if path.is_file() {
        Some(path)
    } else {
        debug!(node = node.key.as_str(), path = %path.display(), "icon image not found");
        None
    }
}

fn node_attrs(node: &Node, config: &MapConfig) -> Vec<(&'static str, String)> {
    let mut attrs = vec![("label", node.label.clone())];
    if let Some(path) = icon_path(node, config) {
        attrs.push(("image", path.display().to_string()));
        attrs.push(("shape", "none".to_string()));
        attrs.push(("labelloc", "b".to_string()));
    }
    attrs
}

fn edge_attrs(edge: &Edge) -> Vec<(&'static str, String)> {
    let mut attrs = vec![("speed", edge.speed.to_string())];
    if let Some(label) = &edge.head_label {
        attrs.push(("headlabel", label.clone()));
    }
    if let Some(label) = &edge.tail_label {
        attrs.push(("taillabel", label.clone()));
    }
    if let Some(color) = &edge.style.color {
        attrs.push(("color", color.clone()));
    }
    if let Some(penwidth) = edge.style.penwidth {
        attrs.push(("penwidth", penwidth.to_string()));
    }
    if let Some(style) = &edge.style.style {
        attrs.push(("style", style.clone()));
    }
    attrs
}

/// Render `graph` as an undirected DOT document.
pub fn render_diagram(graph: &Graph, config: &MapConfig) -> String {
    let mut dot = DotBuilder::new(GRAPH_NAME);
    dot.attr("layout", config.layout.as_str())
        .attr("overlap", "false")
        .node_defaults(&[("shape", "box".to_string())])
        .blank();

    for node in graph.nodes() {
        dot.node(&node.key, &node_attrs(node, config));
    }
    if graph.edge_count() > 0 {
        dot.blank();
    }
    for edge in graph.edges() {
        dot.edge(&edge.tail, &edge.head, &edge_attrs(edge));
    }
    dot.build()
}
