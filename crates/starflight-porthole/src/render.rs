use starflight_engine::core::{Screen, ShaderOptions};
use starflight_engine::paint::{Image, PixelTarget};
use starflight_engine::render::{Shader, ShaderSet};

use crate::alpha::apply_alpha;
use crate::config::{HEIGHT, RenderMode, SPACE, WIDTH};
use crate::star::Star;

/// Uniform member the smudge shader reads the warp factor from.
pub const WARP_FACTOR_UNIFORM: &str = "warp_factor";

/// One pixel per star.
pub fn draw_still<T: PixelTarget + ?Sized>(target: &mut T, stars: &[Star]) {
    for star in stars {
        target.set(star.x as i32, star.y as i32, star.color);
    }
}

/// One pixel per star plus a trail of `floor(warp)` pixels fading out to the left.
pub fn draw_warp<T: PixelTarget + ?Sized>(target: &mut T, stars: &[Star], warp: f64) {
    let step = 1.0 / warp;
    let trail = warp as i32;

    for star in stars {
        let (x, y) = (star.x as i32, star.y as i32);
        target.set(x, y, star.color);
        for i in (1..=trail).rev() {
            target.set(x - i, y, apply_alpha(star.color, 1.0 - step * i as f64));
        }
    }
}

/// Draws the star field and foreground onto the screen.
#[derive(Debug)]
pub struct StarRenderer {
    mode: RenderMode,
    smudge: Option<Shader>,
    /// Offscreen star pixels read by the smudge shader.
    star_layer: Image,
    foreground: Option<Image>,
}

impl StarRenderer {
    /// Shader mode needs `smudge` in `shaders`; without it the renderer
    /// warns and draws directly.
    pub fn new(mode: RenderMode, shaders: &ShaderSet, smudge: &str, foreground: Option<Image>) -> Self {
        let (mode, smudge) = match mode {
            RenderMode::Direct => (RenderMode::Direct, None),
            RenderMode::Shader => match shaders.get(smudge) {
                Some(shader) => (RenderMode::Shader, Some(shader.clone())),
                None => {
                    log::warn!("shader `{smudge}` not loaded; drawing stars directly");
                    (RenderMode::Direct, None)
                }
            },
        };

        Self {
            mode,
            smudge,
            star_layer: Image::new(WIDTH, HEIGHT),
            foreground,
        }
    }

    /// The mode actually in use after any fallback.
    #[inline]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn draw(&mut self, screen: &mut Screen<'_>, stars: &[Star], warp: f64) {
        screen.fill(SPACE);

        match &self.smudge {
            Some(shader) => {
                self.star_layer.clear();
                draw_still(&mut self.star_layer, stars);
                screen.draw_rect_shader(
                    WIDTH,
                    HEIGHT,
                    shader,
                    ShaderOptions::new()
                        .uniform(WARP_FACTOR_UNIFORM, warp as f32)
                        .image(&self.star_layer),
                );
                screen.draw_image(&self.star_layer);
            }
            None if warp == 0.0 => draw_still(screen, stars),
            None => draw_warp(screen, stars, warp),
        }

        if let Some(fg) = &self.foreground {
            screen.draw_image(fg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starflight_engine::paint::Color;
    use starflight_engine::scene::{DrawCmd, DrawList};

    const SMUDGE: &str = r#"
struct Uniforms {
    warp_factor: f32,
};
@group(0) @binding(3) var<uniform> u: Uniforms;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return image0_at(in.uv) * u.warp_factor;
}
"#;

    fn star(x: f64, y: f64, color: Color) -> Star {
        Star { x, y, z: 10.0, color }
    }

    #[test]
    fn still_sets_one_truncated_pixel_per_star() {
        let mut img = Image::new(WIDTH, HEIGHT);
        let stars = [
            star(10.9, 20.2, Color::WHITE),
            star(0.0, 0.0, Color::opaque(1, 2, 3)),
        ];
        draw_still(&mut img, &stars);

        assert_eq!(img.count_visible(), 2);
        assert_eq!(img.pixel(10, 20), Some(Color::WHITE));
        assert_eq!(img.pixel(0, 0), Some(Color::opaque(1, 2, 3)));
    }

    #[test]
    fn warp_draws_head_and_fading_trail() {
        let mut img = Image::new(WIDTH, HEIGHT);
        draw_warp(&mut img, &[star(100.5, 50.0, Color::WHITE)], 4.5);

        assert_eq!(img.count_visible(), 5);
        assert_eq!(img.pixel(100, 50), Some(Color::WHITE));
        let step = 1.0 / 4.5;
        for i in 1..=4 {
            let want = apply_alpha(Color::WHITE, 1.0 - step * i as f64);
            assert_eq!(img.pixel(100 - i, 50), Some(want));
        }
        // Closer to the head is brighter.
        let a = |x| img.pixel(x, 50).map(|c| c.a).unwrap_or(0);
        assert!(a(99) > a(98) && a(98) > a(97) && a(97) > a(96));
        assert_eq!(a(95), 0);
    }

    #[test]
    fn warp_trail_is_clipped_at_left_edge() {
        let mut img = Image::new(WIDTH, HEIGHT);
        draw_warp(&mut img, &[star(1.2, 5.0, Color::WHITE)], 9.9);
        assert_eq!(img.count_visible(), 2);
    }

    #[test]
    fn nearer_star_overwrites_farther() {
        let mut img = Image::new(WIDTH, HEIGHT);
        let far = star(5.0, 5.0, Color::opaque(10, 10, 10));
        let near = star(5.0, 5.0, Color::WHITE);
        draw_still(&mut img, &[far, near]);
        assert_eq!(img.pixel(5, 5), Some(Color::WHITE));
    }

    #[test]
    fn shader_mode_records_fill_shader_layer_foreground() {
        let shaders = ShaderSet::compile([("starsmudge", SMUDGE)]).unwrap();
        let fg = Image::new(WIDTH, HEIGHT);
        let fg_id = fg.id();
        let mut renderer = StarRenderer::new(RenderMode::Shader, &shaders, "starsmudge", Some(fg));
        assert_eq!(renderer.mode(), RenderMode::Shader);

        let mut list = DrawList::new();
        let mut pixels = Image::new(WIDTH, HEIGHT);
        let mut screen = Screen::new(&mut list, &mut pixels);
        renderer.draw(&mut screen, &[star(3.0, 4.0, Color::WHITE)], 2.0);

        let items = list.items();
        assert_eq!(items.len(), 4);
        assert!(matches!(items[0], DrawCmd::Fill(c) if c == SPACE));
        let DrawCmd::Shader(cmd) = &items[1] else { panic!("expected shader") };
        assert_eq!((cmd.width, cmd.height), (WIDTH, HEIGHT));
        assert_eq!(&cmd.uniforms[0..4], &2.0f32.to_le_bytes());
        let layer = cmd.image.as_ref().unwrap();
        assert!(matches!(&items[2], DrawCmd::Image(s) if s.id == layer.id));
        assert!(matches!(&items[3], DrawCmd::Image(s) if s.id == fg_id));
        assert_eq!(pixels.count_visible(), 0);
    }

    #[test]
    fn star_layer_is_cleared_each_frame() {
        let shaders = ShaderSet::compile([("starsmudge", SMUDGE)]).unwrap();
        let mut renderer = StarRenderer::new(RenderMode::Shader, &shaders, "starsmudge", None);

        let mut list = DrawList::new();
        let mut pixels = Image::new(WIDTH, HEIGHT);
        renderer.draw(&mut Screen::new(&mut list, &mut pixels), &[star(3.0, 4.0, Color::WHITE)], 0.0);
        list.clear();
        renderer.draw(&mut Screen::new(&mut list, &mut pixels), &[star(7.0, 4.0, Color::WHITE)], 0.0);

        let DrawCmd::Image(snap) = &list.items()[2] else { panic!("expected layer") };
        let lit = snap.pixels.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn missing_shader_falls_back_to_direct() {
        let renderer = StarRenderer::new(RenderMode::Shader, &ShaderSet::new(), "starsmudge", None);
        assert_eq!(renderer.mode(), RenderMode::Direct);
    }

    #[test]
    fn direct_mode_writes_screen_pixels() {
        let mut renderer = StarRenderer::new(RenderMode::Direct, &ShaderSet::new(), "starsmudge", None);

        let mut list = DrawList::new();
        let mut pixels = Image::new(WIDTH, HEIGHT);
        let mut screen = Screen::new(&mut list, &mut pixels);
        renderer.draw(&mut screen, &[star(50.0, 4.0, Color::WHITE)], 3.5);

        let items = list.items();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], DrawCmd::ScreenPixels));
        assert_eq!(pixels.count_visible(), 4);
    }
}
