use starflight_engine::input::{InputFrame, InputState, Key, MouseButton};

/// A key or mouse button that can trigger a control.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Binding {
    Key(Key),
    Mouse(MouseButton),
}

impl Binding {
    fn held(self, state: &InputState) -> bool {
        match self {
            Binding::Key(key) => state.key_down(key),
            Binding::Mouse(button) => state.button_down(button),
        }
    }

    fn just_pressed(self, frame: &InputFrame) -> bool {
        match self {
            Binding::Key(key) => frame.key_just_pressed(key),
            Binding::Mouse(button) => frame.button_just_pressed(button),
        }
    }
}

/// Input bindings for the porthole controls.
#[derive(Debug, Clone)]
pub struct Controls {
    /// Held to quit.
    pub quit: Vec<Binding>,
    pub warp: Vec<Binding>,
    pub run: Vec<Binding>,
    pub step: Vec<Binding>,
    pub fullscreen: Vec<Binding>,
    /// Double-clicking this toggles fullscreen.
    pub click: Vec<Binding>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            quit: vec![Binding::Key(Key::Q)],
            warp: vec![Binding::Key(Key::Space), Binding::Mouse(MouseButton::Right)],
            run: vec![Binding::Key(Key::R)],
            step: vec![Binding::Key(Key::N)],
            fullscreen: vec![Binding::Key(Key::F)],
            click: vec![Binding::Mouse(MouseButton::Left)],
        }
    }
}

/// Control inputs sampled for one update tick.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ControlInput {
    pub quit: bool,
    pub toggle_warp: bool,
    pub toggle_run: bool,
    pub step: bool,
    pub toggle_fullscreen: bool,
    pub click: bool,
}

impl Controls {
    pub fn poll(&self, state: &InputState, frame: &InputFrame) -> ControlInput {
        let pressed = |bindings: &[Binding]| bindings.iter().any(|b| b.just_pressed(frame));

        ControlInput {
            quit: self.quit.iter().any(|b| b.held(state)),
            toggle_warp: pressed(&self.warp),
            toggle_run: pressed(&self.run),
            step: pressed(&self.step),
            toggle_fullscreen: pressed(&self.fullscreen),
            click: pressed(&self.click),
        }
    }
}
