/// 8-bit RGBA color with premultiplied alpha.
///
/// Invariant:
/// - `r`, `g`, `b` are expected to be `<=` `a` (premultiplied alpha).
///
/// This is the pixel format of [`Image`](super::Image) and of every pixel write
/// made through [`PixelTarget`](super::PixelTarget).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Color {
    pub r: u8, // premultiplied
    pub g: u8, // premultiplied
    pub b: u8, // premultiplied
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    /// Creates a color from premultiplied components.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Creates a premultiplied color from straight-alpha bytes.
    ///
    /// Decoded PNG data is straight alpha; it goes through here before it
    /// lands in an image.
    #[inline]
    pub fn from_straight(r: u8, g: u8, b: u8, a: u8) -> Self {
        let mul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        Self { r: mul(r), g: mul(g), b: mul(b), a }
    }

    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }

    /// Converts to a wgpu clear color (components in `[0, 1]`).
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64 / 255.0,
            g: self.g as f64 / 255.0,
            b: self.b as f64 / 255.0,
            a: self.a as f64 / 255.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_straight_opaque_is_unchanged() {
        assert_eq!(Color::from_straight(10, 200, 255, 255), Color::rgba(10, 200, 255, 255));
    }

    #[test]
    fn from_straight_transparent_zeroes_rgb() {
        assert_eq!(Color::from_straight(10, 200, 255, 0), Color::TRANSPARENT);
    }

    #[test]
    fn from_straight_half_alpha_halves_rgb() {
        let c = Color::from_straight(200, 100, 0, 128);
        assert_eq!(c, Color::rgba(100, 50, 0, 128));
    }

    #[test]
    fn array_round_trip() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(Color::from_array(c.to_array()), c);
    }

    #[test]
    fn to_wgpu_scales_to_unit_range() {
        let c = Color::opaque(0, 0, 255).to_wgpu();
        assert_eq!(c.b, 1.0);
        assert_eq!(c.r, 0.0);
        assert_eq!(c.a, 1.0);
    }
}
