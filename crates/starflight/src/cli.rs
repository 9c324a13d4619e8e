//! Command-line arguments.

use clap::{Parser, ValueEnum};
use starflight_engine::logging::LoggingConfig;
use starflight_engine::window::{LogicalSize, RuntimeConfig};
use starflight_porthole::{Palette, PortholeConfig, RenderMode};

pub const TITLE: &str = "WARP FIVE";

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum PaletteArg {
    /// Random chroma at depth-scaled luma.
    Luma,
    /// Random RGB normalized to full luminance, faded by depth.
    Luminance,
}

impl From<PaletteArg> for Palette {
    fn from(arg: PaletteArg) -> Self {
        match arg {
            PaletteArg::Luma => Palette::Luma,
            PaletteArg::Luminance => Palette::Luminance,
        }
    }
}

/// Warp starfield behind a porthole.
///
/// Keys: Space or right click toggles warp, R pauses, N steps while paused,
/// F or a double click toggles fullscreen, Q quits.
#[derive(Parser, Debug)]
#[command(name = "starflight", version, about)]
pub struct CliArgs {
    /// Seed for a reproducible star field.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Star color palette.
    #[arg(long, value_enum, default_value_t = PaletteArg::Luma)]
    pub palette: PaletteArg,

    /// Draw streaks directly instead of with the smear shader.
    #[arg(long)]
    pub no_shader: bool,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: bool,

    /// Initial window width.
    #[arg(long, default_value_t = 960)]
    pub width: u32,

    /// Initial window height.
    #[arg(long, default_value_t = 540)]
    pub height: u32,

    /// Update ticks per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub tps: u32,

    /// Log filter, e.g. "debug" or "starflight_porthole=trace". Overrides RUST_LOG.
    #[arg(long)]
    pub log: Option<String>,
}

impl CliArgs {
    pub fn porthole_config(&self) -> PortholeConfig {
        PortholeConfig {
            palette: self.palette.into(),
            render_mode: if self.no_shader { RenderMode::Direct } else { RenderMode::Shader },
            seed: self.seed,
            ..PortholeConfig::default()
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: TITLE.to_string(),
            initial_size: LogicalSize::new(self.width as f64, self.height as f64),
            fullscreen: self.fullscreen,
            ticks_per_second: self.tps,
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            env_filter: self.log.clone(),
            ..LoggingConfig::default()
        }
    }
}
