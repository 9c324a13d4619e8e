/// Converts variable frame deltas into a whole number of fixed-rate update ticks.
///
/// Update logic in this engine is tick-based (counters, ramps, double-click
/// windows), so it must run at a fixed rate no matter how fast the display
/// refreshes. Each frame reports its delta; the accumulator returns how many
/// ticks are owed and keeps the fractional remainder for the next frame.
///
/// At most `max_catch_up` ticks are returned per frame. Anything beyond that is
/// dropped instead of queued, so the simulation slows down under load rather than
/// spiralling.
#[derive(Debug, Clone)]
pub struct TickAccumulator {
    step: f64,
    acc: f64,
    max_catch_up: u32,
    total: u64,
}

impl TickAccumulator {
    pub const DEFAULT_MAX_CATCH_UP: u32 = 4;

    /// Creates an accumulator for `ticks_per_second` (clamped to at least 1).
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            step: 1.0 / ticks_per_second.max(1) as f64,
            acc: 0.0,
            max_catch_up: Self::DEFAULT_MAX_CATCH_UP,
            total: 0,
        }
    }

    pub fn with_max_catch_up(mut self, max_catch_up: u32) -> Self {
        self.max_catch_up = max_catch_up.max(1);
        self
    }

    /// Adds `dt` seconds and returns the number of ticks to run now.
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.acc += dt.max(0.0) as f64;

        // Tolerance keeps a 1/60 s frame from landing a hair short of one tick.
        let owed = ((self.acc + 1e-9) / self.step).floor() as u64;
        let ticks = owed.min(self.max_catch_up as u64) as u32;

        if owed > ticks as u64 {
            self.acc = 0.0;
        } else {
            self.acc = (self.acc - ticks as f64 * self.step).max(0.0);
        }

        self.total = self.total.wrapping_add(ticks as u64);
        ticks
    }

    /// Total ticks handed out so far.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_frame_at_tick_rate_is_one_tick() {
        let mut t = TickAccumulator::new(60);
        assert_eq!(t.advance(1.0 / 60.0), 1);
        assert_eq!(t.total(), 1);
    }

    #[test]
    fn fast_display_skips_ticks_on_some_frames() {
        let mut t = TickAccumulator::new(60);
        let ticks: u32 = (0..120).map(|_| t.advance(1.0 / 120.0)).sum();
        assert_eq!(ticks, 60);
    }

    #[test]
    fn slow_display_runs_multiple_ticks_per_frame() {
        let mut t = TickAccumulator::new(60);
        assert_eq!(t.advance(1.0 / 30.0), 2);
    }

    #[test]
    fn remainder_carries_to_next_frame() {
        let mut t = TickAccumulator::new(10);
        assert_eq!(t.advance(0.15), 1);
        assert_eq!(t.advance(0.05), 1);
    }

    #[test]
    fn stall_is_capped_and_backlog_dropped() {
        let mut t = TickAccumulator::new(60).with_max_catch_up(4);
        assert_eq!(t.advance(1.0), 4);
        assert_eq!(t.advance(0.0), 0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut t = TickAccumulator::new(60);
        assert_eq!(t.advance(-1.0), 0);
        assert_eq!(t.total(), 0);
    }
}
