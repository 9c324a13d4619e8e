//! Warp starfield behind a porthole.
//!
//! Stars drift right at a speed set by their depth and the current warp
//! factor, streaking (or smeared by a fragment shader) at speed, with a
//! foreground image composited on top. [`Porthole`] ties it together as a
//! `starflight_engine::core::Game`.

pub mod alpha;
pub mod config;
pub mod controller;
pub mod field;
pub mod input;
pub mod palette;
pub mod render;
pub mod star;
pub mod warp;

pub use alpha::apply_alpha;
pub use config::{PortholeConfig, RenderMode};
pub use controller::{Directives, Porthole};
pub use field::StarField;
pub use input::{Binding, ControlInput, Controls};
pub use palette::Palette;
pub use render::StarRenderer;
pub use star::{Star, StarGenerator};
pub use warp::WarpState;
