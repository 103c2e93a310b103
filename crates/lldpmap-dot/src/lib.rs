//! Graphviz side of lldpmap.
//!
//! - [`dot`]: small undirected DOT writer
//! - [`diagram`]: the static topology diagram
//! - [`graphviz`]: layout and image rendering through the Graphviz programs

pub mod diagram;
pub mod dot;
pub mod graphviz;

pub use diagram::{icon_path, render_diagram};
pub use dot::DotBuilder;
pub use graphviz::{GraphvizLayout, image_format, layout_document, parse_plain, render_image, render_image_with};
