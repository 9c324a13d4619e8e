use rand::Rng;
use starflight_engine::paint::Color;

use crate::config::{DEPTH, HEIGHT, MIN_DEPTH, WIDTH};
use crate::palette::Palette;

/// One star: screen position, depth and depth-derived color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    /// Depth in `[MIN_DEPTH, MIN_DEPTH + DEPTH)`. Larger is nearer: faster and brighter.
    pub z: f64,
    pub color: Color,
}

impl Star {
    /// Depth scaled into `(0, 1]` for coloring.
    #[inline]
    pub fn normalized_depth(&self) -> f64 {
        self.z / (DEPTH + MIN_DEPTH)
    }
}

/// Creates and recycles stars with colors from one palette.
#[derive(Debug, Copy, Clone, Default)]
pub struct StarGenerator {
    palette: Palette,
}

impl StarGenerator {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    #[inline]
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// A star anywhere on screen.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Star {
        let x = rng.random::<f64>() * WIDTH as f64;
        self.spawn(x, rng)
    }

    /// Re-enters `star` at the left edge with new height, depth and color.
    pub fn recycle<R: Rng>(&self, star: &mut Star, rng: &mut R) {
        *star = self.spawn(0.0, rng);
    }

    fn spawn<R: Rng>(&self, x: f64, rng: &mut R) -> Star {
        let y = rng.random::<f64>() * HEIGHT as f64;
        let z = rng.random::<f64>() * DEPTH + MIN_DEPTH;
        let mut star = Star { x, y, z, color: Color::TRANSPARENT };
        star.color = self.palette.pick(star.normalized_depth(), rng);
        star
    }
}
