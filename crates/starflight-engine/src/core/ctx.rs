use crate::input::{InputFrame, InputState};
use crate::paint::{Color, Image, PixelTarget};
use crate::render::Shader;
use crate::scene::{DrawCmd, DrawList, ImageSnapshot, ShaderCmd};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-tick context passed to `core::Game::update`.
pub struct UpdateCtx<'a> {
    pub input: &'a InputState,
    /// Presses since the previous tick.
    pub input_frame: &'a InputFrame,
    /// Timing of the frame this tick runs in.
    pub time: FrameTime,
    /// Index of this tick since startup.
    pub tick: u64,
    pub runtime: &'a mut RuntimeCtx,
}

impl UpdateCtx<'_> {
    #[inline]
    pub fn is_fullscreen(&self) -> bool {
        self.runtime.is_fullscreen()
    }

    #[inline]
    pub fn set_fullscreen(&mut self, on: bool) {
        self.runtime.set_fullscreen(on);
    }

    #[inline]
    pub fn exit(&mut self) {
        self.runtime.exit();
    }
}

/// Uniform values and input image for [`Screen::draw_rect_shader`].
#[derive(Debug, Clone, Default)]
pub struct ShaderOptions<'a> {
    pub uniforms: Vec<(&'a str, f32)>,
    /// Bound as `image0`. A transparent 1x1 image is bound when absent.
    pub image: Option<&'a Image>,
}

impl<'a> ShaderOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the uniform member `name`.
    pub fn uniform(mut self, name: &'a str, value: f32) -> Self {
        self.uniforms.push((name, value));
        self
    }

    pub fn image(mut self, image: &'a Image) -> Self {
        self.image = Some(image);
        self
    }
}

/// The draw target handed to `core::Game::draw`.
///
/// Operations are recorded and executed in order by the compositor after
/// `draw` returns. Direct pixel writes go to a screen-sized pixel layer that
/// is composited at the point of the frame's first write.
pub struct Screen<'a> {
    list: &'a mut DrawList,
    pixels: &'a mut Image,
    pixels_queued: bool,
}

impl<'a> Screen<'a> {
    /// `list` should be empty and `pixels` cleared to the screen size.
    pub fn new(list: &'a mut DrawList, pixels: &'a mut Image) -> Self {
        Self {
            list,
            pixels,
            pixels_queued: false,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Replaces every screen pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        self.list.push(DrawCmd::Fill(color));
    }

    /// Draws `image` at the screen origin, source-over.
    pub fn draw_image(&mut self, image: &Image) {
        self.list.push(DrawCmd::Image(ImageSnapshot::of(image)));
    }

    /// Runs `shader` over a `width` x `height` rect at the screen origin.
    pub fn draw_rect_shader(
        &mut self,
        width: u32,
        height: u32,
        shader: &Shader,
        options: ShaderOptions<'_>,
    ) {
        self.list.push(DrawCmd::Shader(ShaderCmd {
            shader: shader.clone(),
            width,
            height,
            uniforms: shader.uniforms().pack(&options.uniforms),
            image: options.image.map(ImageSnapshot::of),
        }));
    }
}

impl PixelTarget for Screen<'_> {
    #[inline]
    fn size(&self) -> (u32, u32) {
        self.pixels.size()
    }

    fn set(&mut self, x: i32, y: i32, color: Color) {
        if !self.pixels_queued {
            self.list.push(DrawCmd::ScreenPixels);
            self.pixels_queued = true;
        }
        self.pixels.set(x, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: &str = r#"
struct Params {
    gain: f32,
};
@group(0) @binding(3) var<uniform> params: Params;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return image0_at(in.uv) * params.gain;
}
"#;

    #[test]
    fn records_in_call_order() {
        let mut list = DrawList::new();
        let mut pixels = Image::new(8, 4);
        let overlay = Image::new(8, 4);

        let mut screen = Screen::new(&mut list, &mut pixels);
        screen.fill(Color::BLACK);
        screen.set(1, 1, Color::WHITE);
        screen.draw_image(&overlay);

        let items = list.items();
        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], DrawCmd::Fill(c) if c == Color::BLACK));
        assert!(matches!(items[1], DrawCmd::ScreenPixels));
        assert!(matches!(&items[2], DrawCmd::Image(s) if s.id == overlay.id()));
    }

    #[test]
    fn pixel_layer_is_queued_once() {
        let mut list = DrawList::new();
        let mut pixels = Image::new(8, 4);

        let mut screen = Screen::new(&mut list, &mut pixels);
        screen.set(0, 0, Color::WHITE);
        screen.set(1, 0, Color::WHITE);
        screen.set(100, 0, Color::WHITE);
        assert_eq!(screen.size(), (8, 4));

        assert_eq!(list.len(), 1);
        assert_eq!(pixels.count_visible(), 2);
    }

    #[test]
    fn image_snapshot_is_frozen_at_draw_time() {
        let mut list = DrawList::new();
        let mut pixels = Image::new(2, 2);
        let mut layer = Image::new(2, 2);

        Screen::new(&mut list, &mut pixels).draw_image(&layer);
        layer.set(0, 0, Color::WHITE);

        let DrawCmd::Image(snap) = &list.items()[0] else { panic!("expected image") };
        assert!(snap.pixels.iter().all(|&b| b == 0));
        assert!(snap.generation < layer.generation());
    }

    #[test]
    fn shader_draw_packs_uniforms_and_binds_image() {
        let shader = Shader::compile("scale", SCALE).unwrap();
        let mut list = DrawList::new();
        let mut pixels = Image::new(4, 4);
        let layer = Image::new(4, 4);

        let mut screen = Screen::new(&mut list, &mut pixels);
        screen.draw_rect_shader(
            4,
            4,
            &shader,
            ShaderOptions::new().uniform("gain", 2.0).image(&layer),
        );

        let DrawCmd::Shader(cmd) = &list.items()[0] else { panic!("expected shader") };
        assert_eq!((cmd.width, cmd.height), (4, 4));
        assert_eq!(cmd.shader.id(), shader.id());
        assert_eq!(&cmd.uniforms[0..4], &2.0f32.to_le_bytes());
        assert_eq!(cmd.image.as_ref().map(|s| s.id), Some(layer.id()));
    }
}
