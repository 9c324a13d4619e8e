//! Pixel model shared between games and the compositor.
//!
//! Scope:
//! - color representation (8-bit, premultiplied alpha)
//! - CPU images that games write pixels into
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod image;

pub use color::Color;
pub use image::{Image, ImageError};

/// Anything that accepts single-pixel writes.
///
/// Writes replace the destination pixel (no blending) and out-of-bounds
/// coordinates are ignored, so callers can draw partially off-screen.
pub trait PixelTarget {
    /// Target size in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    fn set(&mut self, x: i32, y: i32, color: Color);
}
