//! Raw layout coordinates -> canvas pixels.
//!
//! Layout engines place nodes in their own units with y growing upwards.
//! The canvas is top-down, so the y axis is flipped, and both axes are
//! pulled 10% inwards so icons on the rim are not clipped. The margin is an
//! approximation: extreme raw distributions can still land a few pixels
//! outside the canvas, and nothing clamps them.

use std::collections::BTreeMap;

use tracing::warn;

use crate::layout::RawLayout;

const SCALE: f64 = 0.9;
const MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Integer canvas position, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel {
    pub x: i64,
    pub y: i64,
}

impl Pixel {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Node key -> canvas position.
pub type PixelLayout = BTreeMap<String, Pixel>;

pub struct CoordinateMapper {
    canvas: Canvas,
}

impl CoordinateMapper {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn map(&self, raw: &RawLayout) -> PixelLayout {
        let finite: Vec<_> = raw
            .iter()
            .filter(|(key, point)| {
                if point.is_finite() {
                    true
                } else {
                    warn!(node = key.as_str(), "non-finite layout position, node dropped");
                    false
                }
            })
            .collect();

        let max_x = finite.iter().map(|(_, p)| p.x).fold(0.0_f64, f64::max);
        let max_y = finite.iter().map(|(_, p)| p.y).fold(0.0_f64, f64::max);

        let width = f64::from(self.canvas.width);
        let height = f64::from(self.canvas.height);

        // A lone node has no extent to scale against on either axis.
        let single = finite.len() == 1;
        let spread_x = !single && max_x > 0.0;
        let spread_y = !single && max_y > 0.0;

        finite
            .into_iter()
            .map(|(key, p)| {
                let x = if spread_x {
                    p.x * width / max_x * SCALE - p.x * MARGIN
                } else {
                    width / 2.0
                };
                let y = if spread_y {
                    (height - p.y * height / max_y) * SCALE + p.y * MARGIN
                } else {
                    height / 2.0
                };
                (key.clone(), Pixel::new(x.round() as i64, y.round() as i64))
            })
            .collect()
    }
}
