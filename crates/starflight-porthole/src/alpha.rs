use starflight_engine::paint::Color;

/// Scales all four channels of `color` by `alpha`.
///
/// `alpha` is clamped to `[0, 1]` and each channel is rounded to nearest. This
/// is not blending: it fades the color toward transparent black, which is
/// exactly a premultiplied color at lower opacity.
pub fn apply_alpha(color: Color, alpha: f64) -> Color {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    let scale = |c: u8| ((c as f64 / 255.0) * alpha * 255.0).round().clamp(0.0, 255.0) as u8;

    Color::rgba(scale(color.r), scale(color.g), scale(color.b), scale(color.a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_alpha_is_identity() {
        let c = Color::rgba(12, 200, 255, 255);
        assert_eq!(apply_alpha(c, 1.0), c);
    }

    #[test]
    fn zero_alpha_is_transparent() {
        assert_eq!(apply_alpha(Color::WHITE, 0.0), Color::TRANSPARENT);
    }

    #[test]
    fn half_alpha_halves_every_channel() {
        assert_eq!(apply_alpha(Color::opaque(200, 100, 0), 0.5), Color::rgba(100, 50, 0, 128));
    }

    #[test]
    fn out_of_range_alpha_is_clamped() {
        let c = Color::opaque(10, 20, 30);
        assert_eq!(apply_alpha(c, 3.0), c);
        assert_eq!(apply_alpha(c, -0.5), Color::TRANSPARENT);
        assert_eq!(apply_alpha(c, f64::NAN), Color::TRANSPARENT);
    }

    #[test]
    fn result_stays_premultiplied() {
        let faded = apply_alpha(Color::opaque(255, 128, 3), 0.37);
        assert!(faded.r <= faded.a && faded.g <= faded.a && faded.b <= faded.a);
    }
}
