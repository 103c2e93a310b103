//! Boundary to the external layout engine.
//!
//! Layout itself is never computed here. An engine receives the graph and
//! returns one raw position per node it placed; nodes it did not place are
//! simply missing from the result.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use lldpmap_error::{Error, Result};

use crate::coords::Canvas;
use crate::graph::Graph;

/// Graphviz program used to lay out (and render) the diagram.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LayoutProgram {
    Dot,
    Neato,
    #[default]
    Twopi,
    Circo,
    Fdp,
    Sfdp,
}

impl LayoutProgram {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// A raw layout position, in the engine's own units with a bottom-up y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Node key -> raw position.
pub type RawLayout = BTreeMap<String, Point>;

pub trait LayoutEngine {
    /// Compute raw positions for the nodes of `graph` on a canvas of the
    /// given size.
    fn layout(&self, graph: &Graph, canvas: Canvas) -> Result<RawLayout>;
}

/// Positions computed ahead of time, e.g. exported from another tool.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    positions: RawLayout,
}

impl StaticLayout {
    pub fn new(positions: RawLayout) -> Self {
        Self { positions }
    }

    /// Read a JSON object of `{"node": {"x": .., "y": ..}}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            Error::read_failed(path.display().to_string(), err)
                .with_operation("layout::from_json_file")
        })?;
        let positions: RawLayout = serde_json::from_str(&text).map_err(|err| {
            Error::layout_failed("static", err.to_string())
                .with_operation("layout::from_json_file")
                .with_context("path", path.display().to_string())
                .set_source(err)
        })?;
        Ok(Self::new(positions))
    }
}

impl LayoutEngine for StaticLayout {
    fn layout(&self, graph: &Graph, _canvas: Canvas) -> Result<RawLayout> {
        Ok(graph
            .nodes()
            .iter()
            .filter_map(|node| {
                self.positions
                    .get(&node.key)
                    .map(|point| (node.key.clone(), *point))
            })
            .collect())
    }
}
