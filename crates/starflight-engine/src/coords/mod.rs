//! Coordinate and geometry types shared by the runtime and the compositor.
//!
//! Canonical CPU space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! Two pixel spaces exist per frame: the game's fixed layout resolution and the
//! window surface's physical size. `Viewport::letterbox` maps one onto the other.

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
