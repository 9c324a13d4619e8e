use std::sync::Arc;

use crate::paint::{Color, Image};
use crate::render::Shader;

/// Frozen view of an [`Image`] at the moment it was drawn.
///
/// Holds the pixels by `Arc`, so later writes to the image do not reach frames
/// that were already recorded.
#[derive(Debug, Clone)]
pub struct ImageSnapshot {
    pub id: u64,
    pub generation: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<Vec<u8>>,
}

impl ImageSnapshot {
    pub fn of(image: &Image) -> Self {
        Self {
            id: image.id(),
            generation: image.generation(),
            width: image.width(),
            height: image.height(),
            pixels: image.shared_pixels(),
        }
    }
}

/// A fragment shader run over a `width` x `height` rect at the screen origin.
#[derive(Debug, Clone)]
pub struct ShaderCmd {
    pub shader: Shader,
    pub width: u32,
    pub height: u32,
    /// Packed user uniform block (little-endian, 16-byte multiple).
    pub uniforms: Vec<u8>,
    /// Image bound as `image0`.
    pub image: Option<ImageSnapshot>,
}

/// Screen draw commands, executed in recording order.
#[derive(Debug, Clone)]
pub enum DrawCmd {
    /// Replaces every screen pixel with the color.
    Fill(Color),
    /// Draws an image at the origin, source-over.
    Image(ImageSnapshot),
    /// Runs a user shader.
    Shader(ShaderCmd),
    /// Draws the frame's direct pixel writes, source-over.
    ///
    /// Recorded at the first pixel write of the frame; the compositor reads the
    /// final pixel layer when it reaches this command.
    ScreenPixels,
}
