//! Topology core for lldpmap.
//!
//! - [`registry`]: the device snapshot a run starts from
//! - [`topology`]: deduplicated undirected graph from LLDP neighbor tables
//! - [`layout`]: boundary to the external layout engine
//! - [`coords`]: raw layout positions to canvas pixels
//! - [`config`]: the immutable run configuration

pub mod config;
pub mod coords;
pub mod graph;
pub mod label;
pub mod layout;
pub mod registry;
pub mod topology;

pub use config::{MapConfig, SpeedStyle};
pub use coords::{Canvas, CoordinateMapper, Pixel, PixelLayout};
pub use graph::{Edge, EdgeKey, EdgeStyle, Graph, Node, OrdinalTable};
pub use label::LabelTemplate;
pub use layout::{LayoutEngine, LayoutProgram, Point, RawLayout, StaticLayout};
pub use lldpmap_error::{Error, ErrorKind, Result};
pub use registry::{Device, DeviceDetails, DeviceId, DeviceRegistry, LinkSpeed, NeighborObservation};
pub use topology::{BuildStats, TopologyBuilder};
