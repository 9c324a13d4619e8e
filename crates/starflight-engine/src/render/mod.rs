//! GPU rendering subsystem.
//!
//! The compositor consumes a frame's `scene::DrawList` and issues GPU commands
//! via wgpu. User fragment programs are compiled up front into a `ShaderSet`.
//!
//! Convention:
//! - pixels, top-left origin, +Y down
//! - every pass draws one rect at the target origin (see `shaders/prelude.wgsl`)

mod compositor;
mod ctx;
mod shader;

pub use compositor::Compositor;
pub use ctx::{RenderCtx, RenderTarget};
pub use shader::{
    Shader, ShaderError, ShaderSet, UniformLayout, MAX_UNIFORM_BYTES, PRELUDE,
    USER_UNIFORM_BINDING,
};
