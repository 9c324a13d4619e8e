//! Resources embedded in the binary.

use starflight_engine::paint::{Image, ImageError};
use starflight_engine::render::{ShaderError, ShaderSet};

/// Porthole frame drawn over the stars; the window is transparent.
pub const VIEWPORT_PNG: &[u8] = include_bytes!("../resources/viewport.png");

/// `(name, wgsl)` for every fragment program.
pub const SHADERS: &[(&str, &str)] = &[(
    starflight_porthole::config::SMUDGE_SHADER,
    include_str!("../shaders/starsmudge.wgsl"),
)];

pub fn load_foreground() -> Result<Image, ImageError> {
    Image::from_png(VIEWPORT_PNG)
}

pub fn load_shaders() -> Result<ShaderSet, ShaderError> {
    ShaderSet::compile(SHADERS.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use starflight_porthole::config::{HEIGHT, WIDTH};
    use starflight_porthole::render::WARP_FACTOR_UNIFORM;

    #[test]
    fn foreground_covers_the_screen_with_a_window() {
        let fg = load_foreground().unwrap();
        assert_eq!(fg.size(), (WIDTH, HEIGHT));
        let center = fg.pixel(WIDTH as i32 / 2, HEIGHT as i32 / 2).unwrap();
        assert_eq!(center.a, 0);
        assert_eq!(fg.pixel(0, 0).unwrap().a, 255);
    }

    #[test]
    fn smudge_shader_compiles_with_warp_uniform() {
        let shaders = load_shaders().unwrap();
        assert_eq!(shaders.len(), SHADERS.len());

        let smudge = shaders.get(starflight_porthole::config::SMUDGE_SHADER).unwrap();
        assert_eq!(smudge.uniforms().offset_of(WARP_FACTOR_UNIFORM), Some(0));
    }
}
