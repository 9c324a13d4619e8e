use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Color, PixelTarget};

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_image_id() -> u64 {
    NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Errors produced while building an [`Image`] from encoded data.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// CPU-side RGBA8 canvas (premultiplied alpha, row-major, top-left origin).
///
/// Every image carries a process-unique `id` and a `generation` that bumps on each
/// mutation. The compositor keys its GPU textures on `id` and re-uploads when the
/// generation moves, so an image that is left untouched is uploaded once.
///
/// Pixel storage is shared copy-on-write with the draw list: recording a draw is
/// an `Arc` clone, and writing to the image afterwards copies only while a frame
/// still holds the old pixels.
#[derive(Debug)]
pub struct Image {
    id: u64,
    generation: u64,
    width: u32,
    height: u32,
    pixels: Arc<Vec<u8>>,
}

impl Image {
    /// Creates a fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: next_image_id(),
            generation: 0,
            width,
            height,
            pixels: Arc::new(vec![0; (width as usize) * (height as usize) * 4]),
        }
    }

    /// Decodes a PNG into a premultiplied image.
    pub fn from_png(bytes: &[u8]) -> Result<Self, ImageError> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut pixels = rgba.into_raw();
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&Color::from_straight(px[0], px[1], px[2], px[3]).to_array());
        }

        Ok(Self {
            id: next_image_id(),
            generation: 0,
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw premultiplied RGBA bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn shared_pixels(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.pixels)
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let i = self.index(x, y)?;
        Some(Color::from_array([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]))
    }

    /// Resets every pixel to transparent.
    pub fn clear(&mut self) {
        self.fill(Color::TRANSPARENT);
    }

    /// Sets every pixel to `color`.
    pub fn fill(&mut self, color: Color) {
        let c = color.to_array();
        for px in self.pixels_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    /// Clears the image, reallocating first if the size changed.
    ///
    /// Identity is kept so cached GPU resources can be reused (or resized) in place.
    pub fn reset(&mut self, width: u32, height: u32) {
        if (width, height) == self.size() {
            self.clear();
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = Arc::new(vec![0; (width as usize) * (height as usize) * 4]);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Counts pixels that are not fully transparent.
    pub fn count_visible(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px.iter().any(|&c| c != 0)).count()
    }

    fn pixels_mut(&mut self) -> &mut Vec<u8> {
        self.generation = self.generation.wrapping_add(1);
        Arc::make_mut(&mut self.pixels)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }
}

impl Clone for Image {
    /// Clones pixels under a fresh identity.
    fn clone(&self) -> Self {
        Self {
            id: next_image_id(),
            generation: 0,
            width: self.width,
            height: self.height,
            pixels: Arc::clone(&self.pixels),
        }
    }
}

impl PixelTarget for Image {
    #[inline]
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Replaces the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    #[inline]
    fn set(&mut self, x: i32, y: i32, color: Color) {
        let Some(i) = self.index(x, y) else { return };
        self.pixels_mut()[i..i + 4].copy_from_slice(&color.to_array());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
        let img = image::RgbaImage::from_raw(width, height, rgba.to_vec()).unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn new_image_is_transparent() {
        let img = Image::new(4, 3);
        assert_eq!(img.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(img.count_visible(), 0);
    }

    #[test]
    fn set_and_read_back() {
        let mut img = Image::new(4, 4);
        img.set(2, 1, Color::opaque(9, 8, 7));
        assert_eq!(img.pixel(2, 1), Some(Color::opaque(9, 8, 7)));
        assert_eq!(img.count_visible(), 1);
    }

    #[test]
    fn out_of_bounds_set_is_ignored() {
        let mut img = Image::new(4, 4);
        let before = img.generation();
        img.set(-1, 0, Color::WHITE);
        img.set(0, 4, Color::WHITE);
        img.set(4, 0, Color::WHITE);
        assert_eq!(img.count_visible(), 0);
        assert_eq!(img.generation(), before);
        assert_eq!(img.pixel(-1, 0), None);
    }

    #[test]
    fn mutation_bumps_generation() {
        let mut img = Image::new(2, 2);
        let g0 = img.generation();
        img.set(0, 0, Color::WHITE);
        assert!(img.generation() > g0);
        let g1 = img.generation();
        img.clear();
        assert!(img.generation() > g1);
    }

    #[test]
    fn shared_pixels_are_copied_on_write() {
        let mut img = Image::new(2, 2);
        let snapshot = img.shared_pixels();
        img.set(0, 0, Color::WHITE);
        assert!(snapshot.iter().all(|&b| b == 0));
        assert_eq!(img.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn clone_gets_fresh_identity() {
        let img = Image::new(2, 2);
        let copy = img.clone();
        assert_ne!(img.id(), copy.id());
        assert_eq!(img.as_bytes(), copy.as_bytes());
    }

    #[test]
    fn reset_resizes_and_clears() {
        let mut img = Image::new(2, 2);
        img.set(1, 1, Color::WHITE);
        let id = img.id();
        img.reset(3, 5);
        assert_eq!(img.size(), (3, 5));
        assert_eq!(img.count_visible(), 0);
        assert_eq!(img.id(), id);
    }

    #[test]
    fn png_decode_premultiplies() {
        let png = encode_png(2, 1, &[255, 255, 255, 255, 200, 100, 0, 128]);
        let img = Image::from_png(&png).unwrap();
        assert_eq!(img.size(), (2, 1));
        assert_eq!(img.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(img.pixel(1, 0), Some(Color::rgba(100, 50, 0, 128)));
    }

    #[test]
    fn png_decode_rejects_garbage() {
        let err = Image::from_png(b"definitely not a png").unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
