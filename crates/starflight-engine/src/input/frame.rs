use std::collections::HashSet;

use super::types::{Key, MouseButton};

/// Edge-triggered input collected since the last update tick.
///
/// The runtime clears this after each tick, so a press is reported by
/// exactly one tick even when several ticks run in the same frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Keys that went down.
    pub keys_pressed: HashSet<Key>,

    /// Mouse buttons that went down.
    pub buttons_pressed: HashSet<MouseButton>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
    }

    #[inline]
    pub fn key_just_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    #[inline]
    pub fn button_just_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }
}
