use super::{Rect, Vec2};

/// Surface size in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Largest rect with the aspect ratio of `content`, centered in this viewport.
    ///
    /// The scale is not snapped to integers, so the content always fills one
    /// axis completely and bars appear on the other.
    pub fn letterbox(self, content: (u32, u32)) -> Rect {
        let (cw, ch) = (content.0.max(1) as f32, content.1.max(1) as f32);
        if !self.is_valid() {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        }

        let scale = (self.width / cw).min(self.height / ch);
        let size = Vec2::new(cw, ch) * scale;
        let origin = (Vec2::new(self.width, self.height) - size) * 0.5;
        Rect { origin, size }
    }
}
