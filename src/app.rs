//! Window and event loop.
//!
//! The window, GPU context and renderer only exist once the event loop has
//! resumed, so the application starts `Pending` with just its configuration
//! and becomes `Running` on the first `resumed` call. Each redraw runs one
//! simulation step followed by one rendered frame.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::game::Game;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::overlay::Overlay;
use crate::render::Renderer;

/// Opens the window and runs the demo until it exits.
///
/// Returns the first fatal error raised while running, if any.
pub fn run(config: GameConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = RocketApp {
        state: AppState::Pending(config),
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct RocketApp {
    state: AppState,
    error: Option<Error>,
}

enum AppState {
    Pending(GameConfig),
    Running(Box<Running>),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    overlay: Overlay,
    game: Game,
    input: Input,
    last_frame: Instant,
}

impl RocketApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("{err}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }
}

impl Running {
    fn start(event_loop: &ActiveEventLoop, config: GameConfig) -> Result<Self> {
        let window_attrs = Window::default_attributes()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window.width,
                config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;
        let renderer = Renderer::new(&gpu, config.assets.clone());
        let overlay = Overlay::new(&gpu, &window);
        let game = Game::new(config, gpu.width() as f32, gpu.height() as f32);

        Ok(Self {
            window,
            gpu,
            renderer,
            overlay,
            game,
            input: Input::new(),
            last_frame: Instant::now(),
        })
    }

    fn frame(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.game.update(dt, &self.input);
        self.input.begin_frame();
        if self.game.exit_requested() {
            return Ok(());
        }

        self.renderer.prepare(&self.gpu, &self.game.snapshot())?;

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.renderer
            .draw_scene(&mut encoder, &view, self.gpu.depth_view());
        let edits = self
            .overlay
            .paint(&self.window, &self.gpu, &mut encoder, &view, &self.game);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        edits.apply(&mut self.game);
        Ok(())
    }
}

impl ApplicationHandler for RocketApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Pending(config) = &self.state else {
            return;
        };
        match Running::start(event_loop, config.clone()) {
            Ok(running) => {
                running.window.request_redraw();
                self.state = AppState::Running(Box::new(running));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running(running) = &mut self.state else {
            return;
        };

        let consumed = running.overlay.on_window_event(&running.window, &event);
        running.input.handle_event(&event, consumed);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                running.gpu.resize(size.width, size.height);
                if size.width > 0 && size.height > 0 {
                    running.game.resize(size.width as f32, size.height as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = running.frame() {
                    self.fail(event_loop, err);
                    return;
                }
                if running.game.exit_requested() {
                    event_loop.exit();
                    return;
                }
                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let AppState::Running(running) = &mut self.state {
            running.renderer.cleanup();
        }
    }
}
