use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

use crate::coords::Viewport;
use crate::core::{AppControl, Game, Screen, UpdateCtx};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState};
use crate::paint::Image;
use crate::render::{Compositor, RenderCtx, RenderTarget};
use crate::scene::DrawList;
use crate::time::{FrameClock, TickAccumulator};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Fixed update rate.
    pub ticks_per_second: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "starflight".to_string(),
            initial_size: LogicalSize::new(960.0, 540.0),
            fullscreen: false,
            ticks_per_second: 60,
        }
    }
}

/// Window-level requests a game can make from `update`.
///
/// Requests are applied after the frame is presented. Fullscreen is a desired
/// state rather than a queue of toggles, so flipping it twice within a frame
/// leaves the window untouched.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    fullscreen: bool,
    exit_requested: bool,
}

impl RuntimeCtx {
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_fullscreen(&mut self, on: bool) {
        self.fullscreen = on;
    }

    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `game` until it exits or the window closes.
    ///
    /// Returns the error from `Game::update` if one stopped the loop.
    pub fn run<G>(config: RuntimeConfig, gpu_init: GpuInit, game: G) -> Result<()>
    where
        G: Game + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, game);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,
    ticker: TickAccumulator,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<G>
where
    G: Game + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    game: G,

    window: Option<WindowEntry>,
    runtime: RuntimeCtx,
    draw_list: DrawList,
    screen_pixels: Image,
    compositor: Compositor,

    error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<G> AppState<G>
where
    G: Game + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, game: G) -> Self {
        let runtime = RuntimeCtx {
            fullscreen: config.fullscreen,
            exit_requested: false,
        };

        Self {
            config,
            gpu_init,
            game,
            window: None,
            runtime,
            draw_list: DrawList::new(),
            screen_pixels: Image::new(1, 1),
            compositor: Compositor::new(),
            error: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let fullscreen = self.config.fullscreen.then_some(Fullscreen::Borderless(None));
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_fullscreen(fullscreen);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        let mut entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::new(),
            ticker: TickAccumulator::new(self.config.ticks_per_second),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        // Device setup can take a while; keep it out of the first frame delta.
        entry.with_mut(|f| f.clock.reset());

        log::info!(
            "window `{}` created at {}x{}, {} ticks/s",
            self.config.title,
            self.config.initial_size.width,
            self.config.initial_size.height,
            self.config.ticks_per_second
        );

        self.window = Some(entry);
        Ok(())
    }

    /// Runs the owed update ticks, draws and presents one frame.
    fn frame(&mut self) -> Result<AppControl> {
        let Self {
            game,
            window,
            runtime,
            draw_list,
            screen_pixels,
            compositor,
            ..
        } = self;
        let Some(entry) = window.as_mut() else {
            return Ok(AppControl::Continue);
        };

        entry.with_mut(|f| -> Result<AppControl> {
            // The platform can leave fullscreen on its own (e.g. a system shortcut).
            runtime.fullscreen = f.window.fullscreen().is_some();

            let time = f.clock.tick();
            let ticks = f.ticker.advance(time.dt);
            let first_tick = f.ticker.total() - u64::from(ticks);

            for i in 0..ticks {
                let mut ctx = UpdateCtx {
                    input: &*f.input_state,
                    input_frame: &*f.input_frame,
                    time,
                    tick: first_tick + u64::from(i),
                    runtime: &mut *runtime,
                };
                game.update(&mut ctx)?;

                // Edges are consumed by exactly one tick.
                f.input_frame.clear();

                if runtime.exit_requested {
                    return Ok(AppControl::Exit);
                }
            }

            let logical: LogicalSize<f64> = f.window.inner_size().to_logical(f.window.scale_factor());
            let (w, h) = game.layout(logical.width as u32, logical.height as u32);
            let (w, h) = (w.max(1), h.max(1));

            screen_pixels.reset(w, h);
            draw_list.clear();
            game.draw(&mut Screen::new(draw_list, screen_pixels));

            let size = f.gpu.size();
            if size.width == 0 || size.height == 0 {
                // Minimized: nothing to present into.
                return Ok(AppControl::Continue);
            }

            let mut frame = match f.gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    log::debug!("surface error: {err:?}");
                    let action = f.gpu.handle_surface_error(err);
                    if action == SurfaceErrorAction::Fatal {
                        log::error!("surface out of memory; stopping");
                        return Ok(AppControl::Exit);
                    }
                    return Ok(AppControl::Continue);
                }
            };

            let rctx = RenderCtx::new(
                f.gpu.device(),
                f.gpu.queue(),
                f.gpu.surface_format(),
                Viewport::new(size.width as f32, size.height as f32),
            );

            // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
            {
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
                compositor.render(&rctx, &mut target, draw_list, screen_pixels, (w, h));
            }

            f.window.pre_present_notify();
            f.gpu.submit(frame);

            Ok(AppControl::Continue)
        })
    }

    fn apply_runtime_requests(&mut self, event_loop: &ActiveEventLoop) {
        if self.runtime.exit_requested {
            self.request_exit(event_loop);
            return;
        }

        let Some(entry) = self.window.as_ref() else { return };
        let want = self.runtime.fullscreen;
        entry.with_window(|w| {
            if w.fullscreen().is_some() != want {
                log::info!("fullscreen {}", if want { "on" } else { "off" });
                w.set_fullscreen(want.then_some(Fullscreen::Borderless(None)));
            }
        });
    }
}

impl<G> ApplicationHandler for AppState<G>
where
    G: Game + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.error = Some(e);
            self.request_exit(event_loop);
            return;
        }

        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the FIFO present mode paces the loop.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.window.as_mut() else { return };

        if let Some(ev) = translate_window_event(&event) {
            entry.with_mut(|f| f.input_state.apply_event(f.input_frame, ev));
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("window closed");
                self.window = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => match self.frame() {
                Ok(AppControl::Continue) => self.apply_runtime_requests(event_loop),
                Ok(AppControl::Exit) => self.request_exit(event_loop),
                Err(e) => {
                    log::error!("update failed: {e:#}");
                    self.error = Some(e);
                    self.request_exit(event_loop);
                }
            },

            _ => {}
        }
    }
}
