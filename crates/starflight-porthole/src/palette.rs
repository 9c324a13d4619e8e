use std::fmt;

use rand::Rng;
use starflight_engine::paint::Color;

use crate::alpha::apply_alpha;

/// Policy mapping a star's normalized depth to its color.
///
/// Both policies use fresh random draws per star; for any fixed draw each
/// output channel is non-decreasing in depth, so nearer stars are brighter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Palette {
    /// Depth sets the luma; chroma is random. Opaque.
    #[default]
    Luma,
    /// Random hue normalized to full luminance, then faded by depth.
    Luminance,
}

impl Palette {
    /// Picks a color for `depth` in `(0, 1]`.
    pub fn pick<R: Rng>(self, depth: f64, rng: &mut R) -> Color {
        match self {
            Palette::Luma => {
                let cb: u8 = rng.random();
                let cr: u8 = rng.random();
                luma_color(depth, cb, cr)
            }
            Palette::Luminance => {
                let rgb: [u8; 3] = [rng.random(), rng.random(), rng.random()];
                luminance_color(depth, rgb)
            }
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Palette::Luma => "luma",
            Palette::Luminance => "luminance",
        })
    }
}

pub(crate) fn luma_color(depth: f64, cb: u8, cr: u8) -> Color {
    let luma = (255.0 * depth.clamp(0.0, 1.0)) as u8;
    let (r, g, b) = ycbcr_to_rgb(luma, cb, cr);
    Color::opaque(r, g, b)
}

pub(crate) fn luminance_color(depth: f64, [r, g, b]: [u8; 3]) -> Color {
    let lum = r as f64 * 0.2126 + g as f64 * 0.7152 + b as f64 * 0.0722;
    let full = if lum <= 0.0 {
        Color::WHITE
    } else {
        let k = 255.0 / lum;
        let scale = |c: u8| (c as f64 * k).clamp(0.0, 255.0) as u8;
        Color::opaque(scale(r), scale(g), scale(b))
    };
    apply_alpha(full, depth)
}

/// JFIF YCbCr to RGB in 16.16 fixed point, clamped per channel.
///
/// Integer-exact, so the same `(y, cb, cr)` always yields the same bytes.
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> (u8, u8, u8) {
    let yy = y as i32 * 0x10101;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;

    let r = yy + 91881 * cr;
    let g = yy - 22554 * cb - 46802 * cr;
    let b = yy + 116130 * cb;

    (clamp_fixed(r), clamp_fixed(g), clamp_fixed(b))
}

#[inline]
fn clamp_fixed(v: i32) -> u8 {
    if v < 0 {
        0
    } else if v > 0xff_ffff {
        255
    } else {
        (v >> 16) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn depths() -> impl Iterator<Item = f64> {
        (1..=20).map(|i| i as f64 / 20.0)
    }

    fn non_decreasing(a: Color, b: Color) -> bool {
        a.r <= b.r && a.g <= b.g && a.b <= b.b && a.a <= b.a
    }

    #[test]
    fn neutral_chroma_is_gray() {
        assert_eq!(ycbcr_to_rgb(0, 128, 128), (0, 0, 0));
        assert_eq!(ycbcr_to_rgb(255, 128, 128), (255, 255, 255));
        assert_eq!(ycbcr_to_rgb(100, 128, 128), (100, 100, 100));
    }

    #[test]
    fn extreme_chroma_clamps() {
        // Strong red: R saturates high, G and B clamp at zero.
        assert_eq!(ycbcr_to_rgb(128, 128, 255).0, 255);
        assert_eq!(ycbcr_to_rgb(0, 0, 255).2, 0);
    }

    #[test]
    fn luma_policy_is_opaque_and_monotonic() {
        for (cb, cr) in [(0, 0), (128, 128), (255, 0), (17, 230), (255, 255)] {
            let mut prev = luma_color(0.0, cb, cr);
            for d in depths() {
                let c = luma_color(d, cb, cr);
                assert_eq!(c.a, 255);
                assert!(non_decreasing(prev, c), "cb={cb} cr={cr} d={d}");
                prev = c;
            }
        }
    }

    #[test]
    fn luminance_policy_is_monotonic() {
        for rgb in [[255, 0, 0], [3, 200, 90], [10, 10, 10], [0, 0, 0]] {
            let mut prev = luminance_color(0.0, rgb);
            for d in depths() {
                let c = luminance_color(d, rgb);
                assert!(non_decreasing(prev, c), "rgb={rgb:?} d={d}");
                prev = c;
            }
        }
    }

    #[test]
    fn luminance_policy_black_draw_is_white() {
        assert_eq!(luminance_color(1.0, [0, 0, 0]), Color::WHITE);
    }

    #[test]
    fn luminance_policy_fades_with_depth() {
        let c = luminance_color(0.5, [0, 255, 0]);
        assert_eq!(c.a, 128);
        assert_eq!(c.r, 0);
    }

    #[test]
    fn pick_is_deterministic_per_seed() {
        for palette in [Palette::Luma, Palette::Luminance] {
            let mut a = ChaCha8Rng::seed_from_u64(7);
            let mut b = ChaCha8Rng::seed_from_u64(7);
            for d in depths() {
                assert_eq!(palette.pick(d, &mut a), palette.pick(d, &mut b));
            }
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Palette::Luma.to_string(), "luma");
        assert_eq!(Palette::Luminance.to_string(), "luminance");
    }
}
