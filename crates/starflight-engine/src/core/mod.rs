//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform loop)
//! and games: the `Game` trait, the per-tick update context and the screen a
//! frame is drawn onto.

mod ctx;
mod game;

pub use ctx::{Screen, ShaderOptions, UpdateCtx};
pub use game::{AppControl, Game};
