//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window; call `tick()` once per presented frame
//! - feed the frame delta to a `TickAccumulator` to get the number of fixed-rate
//!   update ticks owed for that frame

mod frame_clock;
mod ticker;

pub use frame_clock::{FrameClock, FrameTime};
pub use ticker::TickAccumulator;
