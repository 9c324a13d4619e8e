use starflight_engine::paint::Color;

use crate::palette::Palette;

/// Logical screen width in pixels.
pub const WIDTH: u32 = 480;
/// Logical screen height in pixels.
pub const HEIGHT: u32 = 270;

/// Depth range above `MIN_DEPTH`; stars live in `[MIN_DEPTH, MIN_DEPTH + DEPTH)`.
pub const DEPTH: f64 = 20.0;
pub const MIN_DEPTH: f64 = 5.0;

pub const STARS: usize = 75;

/// Divides `warp * z` into the per-tick horizontal step.
pub const SLOWNESS: f64 = 45.0;

pub const TARGET_WARP: f64 = 9.9;
/// Warp factor change per tick while ramping.
pub const WARP_RAMP: f64 = 0.1;

/// Two primary clicks closer than this many ticks count as a double click.
pub const DOUBLE_CLICK_TICKS: u64 = 15;

/// Background behind the stars.
pub const SPACE: Color = Color::opaque(0, 0, 7);

/// Name of the smear shader in the `ShaderSet`.
pub const SMUDGE_SHADER: &str = "starsmudge";

/// How the star layer reaches the screen.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RenderMode {
    /// Stars drawn still into an offscreen layer, smeared by a fragment
    /// shader, then the raw layer drawn on top.
    #[default]
    Shader,
    /// Stars (or streaks at warp) written straight to the screen.
    Direct,
}

/// Startup options for a [`Porthole`](crate::Porthole).
#[derive(Debug, Clone)]
pub struct PortholeConfig {
    pub stars: usize,
    pub palette: Palette,
    pub render_mode: RenderMode,
    /// Fixed seed for a reproducible field; drawn at random when `None`.
    pub seed: Option<u64>,
    pub smudge_shader: String,
}

impl Default for PortholeConfig {
    fn default() -> Self {
        Self {
            stars: STARS,
            palette: Palette::default(),
            render_mode: RenderMode::default(),
            seed: None,
            smudge_shader: SMUDGE_SHADER.to_string(),
        }
    }
}
