//! Starflight engine crate.
//!
//! A small winit + wgpu host for pixel games: a fixed-rate `Game` loop,
//! CPU pixel images, a recorded screen draw list and a GPU compositor that
//! runs user fragment shaders and scales the result onto the window.

pub mod core;
pub mod device;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
