use super::ctx::{Screen, UpdateCtx};

/// Control directive used by the runtime to stop the loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Game contract driven by the runtime.
///
/// Per redraw the runtime calls `update` zero or more times at the fixed tick
/// rate, then `layout` and `draw` once.
pub trait Game {
    /// Advances game state by one tick.
    ///
    /// An error stops the runtime; `Runtime::run` returns it.
    fn update(&mut self, ctx: &mut UpdateCtx<'_>) -> anyhow::Result<()>;

    /// Records the current frame onto `screen`.
    fn draw(&mut self, screen: &mut Screen<'_>);

    /// Returns the logical screen size for a window of `outer_width` x
    /// `outer_height` logical pixels. The screen is scaled to fit the window.
    fn layout(&self, outer_width: u32, outer_height: u32) -> (u32, u32);
}
