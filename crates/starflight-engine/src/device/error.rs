/// What the runtime should do after frame acquisition fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Lost or outdated surface was reconfigured; try again next redraw.
    Reconfigured,
    /// Timeout or unspecified error; drop this frame only.
    SkipFrame,
    /// Out of memory; stop the runtime.
    Fatal,
}
