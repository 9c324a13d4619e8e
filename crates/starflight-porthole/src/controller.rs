use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starflight_engine::core::{Game, Screen, UpdateCtx};
use starflight_engine::paint::Image;
use starflight_engine::render::ShaderSet;

use crate::config::{DOUBLE_CLICK_TICKS, HEIGHT, PortholeConfig, WIDTH};
use crate::field::StarField;
use crate::input::{ControlInput, Controls};
use crate::render::StarRenderer;
use crate::star::StarGenerator;
use crate::warp::WarpState;

/// Window-level effects of one update tick.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Directives {
    /// Flip fullscreen once. Two flips in one tick cancel.
    pub toggle_fullscreen: bool,
    pub quit: bool,
}

/// The warp scene: star field, warp state and renderer driven by input.
#[derive(Debug)]
pub struct Porthole {
    seed: u64,
    rng: ChaCha8Rng,
    generator: StarGenerator,
    field: StarField,
    warp: WarpState,
    renderer: StarRenderer,
    controls: Controls,

    counter: u64,
    last_click: Option<u64>,
}

impl Porthole {
    pub fn new(config: PortholeConfig, shaders: &ShaderSet, foreground: Option<Image>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generator = StarGenerator::new(config.palette);
        let field = StarField::build(config.stars, &generator, &mut rng);
        let renderer =
            StarRenderer::new(config.render_mode, shaders, &config.smudge_shader, foreground);

        log::info!(
            "porthole: {} stars, seed {seed}, palette {}, {:?} rendering",
            field.len(),
            generator.palette(),
            renderer.mode()
        );

        Self {
            seed,
            rng,
            generator,
            field,
            warp: WarpState::default(),
            renderer,
            controls: Controls::default(),
            counter: 0,
            last_click: None,
        }
    }

    /// Replaces the default input bindings.
    pub fn with_controls(mut self, controls: Controls) -> Self {
        self.controls = controls;
        self
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn field(&self) -> &StarField {
        &self.field
    }

    #[inline]
    pub fn warp(&self) -> &WarpState {
        &self.warp
    }

    /// Ticks run so far.
    #[inline]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Runs one update tick.
    pub fn step(&mut self, input: ControlInput) -> Directives {
        let mut out = Directives::default();
        self.counter += 1;

        // Terminating is not supported in the browser.
        if input.quit && !cfg!(target_arch = "wasm32") {
            out.quit = true;
            return out;
        }

        if input.toggle_warp {
            self.warp.toggle_warp();
        }
        if input.toggle_run {
            self.warp.toggle_run();
        }

        let advance = self.warp.run() || input.step;
        if advance {
            self.warp.ramp();
        }

        if input.toggle_fullscreen {
            out.toggle_fullscreen ^= true;
        }

        if input.click {
            let counter = self.counter;
            if self.last_click.is_some_and(|last| counter - last < DOUBLE_CLICK_TICKS) {
                out.toggle_fullscreen ^= true;
            }
            self.last_click = Some(self.counter);
        }

        if advance {
            let recycled = self.field.advance(self.warp.factor(), &self.generator, &mut self.rng);
            if recycled > 0 {
                log::trace!("tick {}: recycled {recycled} stars", self.counter);
            }
        }

        out
    }
}

impl Game for Porthole {
    fn update(&mut self, ctx: &mut UpdateCtx<'_>) -> anyhow::Result<()> {
        let input = self.controls.poll(ctx.input, ctx.input_frame);
        let directives = self.step(input);

        if directives.quit {
            log::info!("quit requested");
            ctx.exit();
            return Ok(());
        }
        if directives.toggle_fullscreen {
            let on = !ctx.is_fullscreen();
            ctx.set_fullscreen(on);
        }
        Ok(())
    }

    fn draw(&mut self, screen: &mut Screen<'_>) {
        self.renderer.draw(screen, self.field.stars(), self.warp.factor());
    }

    fn layout(&self, _outer_width: u32, _outer_height: u32) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RenderMode, STARS, TARGET_WARP};

    fn porthole() -> Porthole {
        let config = PortholeConfig {
            seed: Some(42),
            render_mode: RenderMode::Direct,
            ..PortholeConfig::default()
        };
        Porthole::new(config, &ShaderSet::new(), None)
    }

    fn click() -> ControlInput {
        ControlInput { click: true, ..ControlInput::default() }
    }

    fn idle(p: &mut Porthole, ticks: u64) {
        for _ in 0..ticks {
            p.step(ControlInput::default());
        }
    }

    #[test]
    fn double_click_within_window_toggles_fullscreen() {
        let mut p = porthole();
        assert!(!p.step(click()).toggle_fullscreen);
        idle(&mut p, 9);
        assert!(p.step(click()).toggle_fullscreen);
    }

    #[test]
    fn slow_clicks_do_not_toggle_fullscreen() {
        let mut p = porthole();
        assert!(!p.step(click()).toggle_fullscreen);
        idle(&mut p, 19);
        assert!(!p.step(click()).toggle_fullscreen);
    }

    #[test]
    fn first_click_right_after_start_is_single() {
        let mut p = porthole();
        assert!(!p.step(click()).toggle_fullscreen);
    }

    #[test]
    fn key_and_double_click_in_one_tick_cancel() {
        let mut p = porthole();
        p.step(click());
        let both = ControlInput { toggle_fullscreen: true, click: true, ..ControlInput::default() };
        assert!(!p.step(both).toggle_fullscreen);
    }

    #[test]
    fn ramps_to_target_while_running() {
        let mut p = porthole();
        idle(&mut p, 200);
        assert_eq!(p.warp().factor(), TARGET_WARP);
        assert_eq!(p.field().len(), STARS);
    }

    #[test]
    fn paused_holds_still_until_stepped() {
        let mut p = porthole();
        p.step(ControlInput { toggle_run: true, ..ControlInput::default() });
        let frozen = p.field().stars().to_vec();
        let factor = p.warp().factor();

        idle(&mut p, 10);
        assert_eq!(p.field().stars(), frozen.as_slice());
        assert_eq!(p.warp().factor(), factor);

        p.step(ControlInput { step: true, ..ControlInput::default() });
        assert!(p.warp().factor() > factor);
    }

    #[test]
    fn warp_toggle_ramps_back_down() {
        let mut p = porthole();
        idle(&mut p, 50);
        let peak = p.warp().factor();
        p.step(ControlInput { toggle_warp: true, ..ControlInput::default() });
        assert!(p.warp().factor() < peak);
        idle(&mut p, 200);
        assert_eq!(p.warp().factor(), 0.0);
    }

    #[test]
    fn quit_stops_the_tick() {
        let mut p = porthole();
        let out = p.step(ControlInput { quit: true, toggle_warp: true, ..ControlInput::default() });
        assert_eq!(out.quit, !cfg!(target_arch = "wasm32"));
        assert_eq!(p.counter(), 1);
        assert!(p.warp().warp());
    }

    #[test]
    fn same_seed_builds_same_field() {
        assert_eq!(porthole().field().stars(), porthole().field().stars());
        assert_eq!(porthole().seed(), 42);
    }

    #[test]
    fn layout_is_fixed() {
        let p = porthole();
        assert_eq!(p.layout(1920, 1080), (WIDTH, HEIGHT));
        assert_eq!(p.layout(1, 1), (WIDTH, HEIGHT));
    }
}
