//! Scene (draw stream) types.
//!
//! `core::Screen` records into a `DrawList`; `render::Compositor` executes it.

mod cmd;
mod list;

pub use cmd::{DrawCmd, ImageSnapshot, ShaderCmd};
pub use list::DrawList;
