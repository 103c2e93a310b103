//! Undirected topology graph.
//!
//! Nodes are keyed by system name and kept in insertion order. Edges are
//! keyed by the unordered pair of their endpoints, so a link reported from
//! both sides can only ever exist once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::registry::DeviceId;

/// A monitored device that made it onto the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Canonical system name, unique within a graph.
    pub key: String,
    pub external_id: DeviceId,
    pub label: String,
    pub icon: Option<String>,
}

/// Visual attributes of a link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub penwidth: Option<f64>,
    #[serde(default)]
    pub style: Option<String>,
}

impl EdgeStyle {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.penwidth.is_none() && self.style.is_none()
    }
}

/// Order-independent identity of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(String, String);

impl EdgeKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// A physical link between two nodes.
///
/// `tail` is the node whose observation created the edge, `head` the one it
/// reported. Port labels follow Graphviz naming: `head_label` names the
/// port on `head`, `tail_label` the port on `tail`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub tail: String,
    pub head: String,
    /// Link speed in Mbit/s.
    pub speed: u64,
    pub style: EdgeStyle,
    pub head_label: Option<String>,
    pub tail_label: Option<String>,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(&self.tail, &self.head)
    }

    pub fn touches(&self, node: &str) -> bool {
        self.tail == node || self.head == node
    }

    /// Record the label of a port that sits on `endpoint`.
    pub fn set_port_label(&mut self, endpoint: &str, label: String) {
        if endpoint == self.head {
            self.head_label = Some(label);
        } else if endpoint == self.tail {
            self.tail_label = Some(label);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_index: HashMap<EdgeKey, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns `false` (and leaves the graph untouched) if the
    /// key is empty or already present.
    pub fn add_node(&mut self, node: Node) -> bool {
        if node.key.is_empty() || self.node_index.contains_key(&node.key) {
            return false;
        }
        self.node_index.insert(node.key.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn contains_node(&self, key: &str) -> bool {
        self.node_index.contains_key(key)
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.node_index.get(key).map(|&idx| &self.nodes[idx])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        self.edge_index
            .get(&EdgeKey::new(a, b))
            .map(|&idx| &self.edges[idx])
    }

    pub fn edge_between_mut(&mut self, a: &str, b: &str) -> Option<&mut Edge> {
        match self.edge_index.get(&EdgeKey::new(a, b)) {
            Some(&idx) => Some(&mut self.edges[idx]),
            None => None,
        }
    }

    /// Insert a new edge. Returns `false` for self-loops, dangling endpoints
    /// and pairs that already have an edge.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if edge.tail == edge.head
            || !self.contains_node(&edge.tail)
            || !self.contains_node(&edge.head)
        {
            return false;
        }
        let key = edge.key();
        if self.edge_index.contains_key(&key) {
            return false;
        }
        self.edge_index.insert(key, self.edges.len());
        self.edges.push(edge);
        true
    }

    /// Edges incident to `key`.
    pub fn edges_of<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.touches(key))
    }

    /// Run-scoped 1-based ordinals, in node insertion order.
    pub fn ordinals(&self) -> OrdinalTable {
        OrdinalTable::from_keys(self.nodes.iter().map(|node| node.key.as_str()))
    }
}

/// Node key -> 1-based ordinal for one run.
///
/// Kept apart from [`Node`] so bookkeeping never leaks into node attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdinalTable {
    ordinals: HashMap<String, u32>,
}

impl OrdinalTable {
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ordinals = HashMap::new();
        for key in keys {
            let next = ordinals.len() as u32 + 1;
            ordinals.entry(key.to_string()).or_insert(next);
        }
        Self { ordinals }
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.ordinals.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(key: &str) -> Node {
        Node {
            key: key.to_string(),
            external_id: DeviceId::new(format!("id-{key}")),
            label: key.to_string(),
            icon: None,
        }
    }

    fn edge(tail: &str, head: &str) -> Edge {
        Edge {
            tail: tail.to_string(),
            head: head.to_string(),
            speed: 0,
            style: EdgeStyle::default(),
            head_label: None,
            tail_label: None,
        }
    }

    #[test]
    fn test_node_keys_unique() {
        let mut graph = Graph::new();
        assert!(graph.add_node(node("a")));
        assert!(!graph.add_node(node("a")));
        assert!(!graph.add_node(node("")));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_edge_key_is_unordered() {
        assert_eq!(EdgeKey::new("a", "b"), EdgeKey::new("b", "a"));

        let mut graph = Graph::new();
        graph.add_node(node("a"));
        graph.add_node(node("b"));
        assert!(graph.add_edge(edge("a", "b")));
        assert!(!graph.add_edge(edge("b", "a")));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.edge_between("b", "a").is_some());
    }

    #[test]
    fn test_rejects_self_loops_and_dangling() {
        let mut graph = Graph::new();
        graph.add_node(node("a"));
        assert!(!graph.add_edge(edge("a", "a")));
        assert!(!graph.add_edge(edge("a", "x")));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_port_label_sides() {
        let mut e = edge("a", "b");
        e.set_port_label("b", "ge-0/0/1".to_string());
        e.set_port_label("a", "ge-0/0/2".to_string());
        e.set_port_label("z", "ignored".to_string());
        assert_eq!(e.head_label.as_deref(), Some("ge-0/0/1"));
        assert_eq!(e.tail_label.as_deref(), Some("ge-0/0/2"));
    }

    #[test]
    fn test_ordinals_follow_insertion() {
        let mut graph = Graph::new();
        for key in ["c", "a", "b"] {
            graph.add_node(node(key));
        }
        let ordinals = graph.ordinals();
        assert_eq!(ordinals.get("c"), Some(1));
        assert_eq!(ordinals.get("a"), Some(2));
        assert_eq!(ordinals.get("b"), Some(3));
        assert_eq!(ordinals.get("d"), None);
    }
}
