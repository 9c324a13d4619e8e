use crate::config::{TARGET_WARP, WARP_RAMP};

/// Warp speed and the toggles that steer it.
///
/// `factor` stays within `[0, target]`: it ramps toward `target` while `warp`
/// is on and back toward zero while it is off.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WarpState {
    factor: f64,
    target: f64,
    ramp: f64,
    warp: bool,
    run: bool,
}

impl Default for WarpState {
    fn default() -> Self {
        Self::new(TARGET_WARP, WARP_RAMP)
    }
}

impl WarpState {
    /// Stationary, heading for warp, running.
    pub fn new(target: f64, ramp: f64) -> Self {
        Self {
            factor: 0.0,
            target,
            ramp,
            warp: true,
            run: true,
        }
    }

    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn warp(&self) -> bool {
        self.warp
    }

    #[inline]
    pub fn run(&self) -> bool {
        self.run
    }

    pub fn toggle_warp(&mut self) {
        self.warp = !self.warp;
        log::debug!("warp {}", if self.warp { "engaged" } else { "disengaged" });
    }

    pub fn toggle_run(&mut self) {
        self.run = !self.run;
        log::debug!("run {}", if self.run { "on" } else { "paused" });
    }

    /// Moves `factor` one ramp step toward its goal.
    pub fn ramp(&mut self) {
        if self.warp && self.factor < self.target {
            self.factor = (self.factor + self.ramp).min(self.target);
        } else if (!self.warp || self.factor > self.target) && self.factor > 0.0 {
            self.factor = (self.factor - self.ramp).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_stationary_with_warp_and_run_on() {
        let state = WarpState::default();
        assert_eq!(state.factor(), 0.0);
        assert_eq!(state.target(), TARGET_WARP);
        assert!(state.warp());
        assert!(state.run());
    }

    #[test]
    fn ramps_up_to_exactly_target() {
        let mut state = WarpState::default();
        let mut prev = state.factor();
        for _ in 0..500 {
            state.ramp();
            assert!(state.factor() >= prev);
            assert!(state.factor() <= TARGET_WARP);
            prev = state.factor();
        }
        assert_eq!(state.factor(), TARGET_WARP);
    }

    #[test]
    fn ramps_down_to_exactly_zero() {
        let mut state = WarpState::default();
        for _ in 0..200 {
            state.ramp();
        }
        state.toggle_warp();

        let mut prev = state.factor();
        for _ in 0..500 {
            state.ramp();
            assert!(state.factor() <= prev);
            assert!(state.factor() >= 0.0);
            prev = state.factor();
        }
        assert_eq!(state.factor(), 0.0);
    }

    #[test]
    fn reversing_mid_ramp_turns_around() {
        let mut state = WarpState::default();
        for _ in 0..30 {
            state.ramp();
        }
        let peak = state.factor();
        assert!(peak > 0.0 && peak < TARGET_WARP);

        state.toggle_warp();
        state.ramp();
        assert!(state.factor() < peak);
    }

    #[test]
    fn toggles_flip() {
        let mut state = WarpState::default();
        state.toggle_run();
        assert!(!state.run());
        state.toggle_run();
        assert!(state.run());
        state.toggle_warp();
        assert!(!state.warp());
    }
}
