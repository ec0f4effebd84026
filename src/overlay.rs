//! Debug overlay drawn with egui on top of the scene.
//!
//! Two windows: **WorldStats** (terrain and rocket) and **GameStats** (clock,
//! camera and lights). The overlay only reads the [`Game`]; anything the user
//! changes comes back as [`OverlayEdits`] and is applied through the game's
//! setters once the frame is recorded.

use glam::{Vec3, Vec4};
use winit::window::Window;

use crate::game::{Game, LightSlot};
use crate::gpu::GpuContext;

/// Changes requested through the overlay this frame.
#[derive(Debug, Default, PartialEq)]
pub struct OverlayEdits {
    pub rocket_speed: Option<f32>,
    pub time_scale: Option<f32>,
    pub light_colours: Vec<(LightSlot, Vec4)>,
}

impl OverlayEdits {
    pub fn is_empty(&self) -> bool {
        self.rocket_speed.is_none() && self.time_scale.is_none() && self.light_colours.is_empty()
    }

    pub fn apply(self, game: &mut Game) {
        if let Some(speed) = self.rocket_speed {
            game.set_rocket_speed(speed);
        }
        if let Some(time_scale) = self.time_scale {
            game.set_time_scale(time_scale);
        }
        for (slot, colour) in self.light_colours {
            game.set_light_colour(slot, colour);
        }
    }
}

pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(gpu: &GpuContext, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let viewport_id = ctx.viewport_id();
        let state = egui_winit::State::new(ctx.clone(), viewport_id, window, None, None, None);
        let renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.config.format,
            egui_wgpu::RendererOptions::default(),
        );
        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Feeds a window event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Builds the panels for `game` and records them into `encoder` over
    /// `view`, keeping what is already there.
    pub fn paint(
        &mut self,
        window: &Window,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        game: &Game,
    ) -> OverlayEdits {
        let raw_input = self.state.take_egui_input(window);
        let mut edits = OverlayEdits::default();
        let full_output = self.ctx.run(raw_input, |ctx| {
            if game.overlay_visible() {
                edits = show_panels(ctx, game);
            }
        });

        let egui::FullOutput {
            platform_output,
            textures_delta,
            shapes,
            pixels_per_point,
            ..
        } = full_output;

        self.state.handle_platform_output(window, platform_output);
        let paint_jobs = self.ctx.tessellate(shapes, pixels_per_point);

        for (id, image_delta) in &textures_delta.set {
            self.renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.width(), gpu.height()],
            pixels_per_point,
        };
        self.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let mut render_pass = render_pass.forget_lifetime();
            self.renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &textures_delta.free {
            self.renderer.free_texture(id);
        }

        edits
    }
}

fn vec3_label(v: Vec3) -> String {
    format!("{:.2}, {:.2}, {:.2}", v.x, v.y, v.z)
}

fn show_panels(ctx: &egui::Context, game: &Game) -> OverlayEdits {
    let mut edits = OverlayEdits::default();

    egui::Window::new("WorldStats").show(ctx, |ui| {
        let terrain = &game.config().terrain;
        ui.collapsing("Terrain", |ui| {
            ui.label(format!("Scale: {:.2}", terrain.scale));
            ui.label(format!("Cubes in X: {}", terrain.x));
            ui.label(format!("Cubes in Y: {}", terrain.y));
            ui.label(format!("Cubes in Z: {}", terrain.z));
            ui.label(format!("Cube count: {}", game.cube_count()));
        });
        ui.collapsing("Rocket", |ui| {
            let mut speed = game.rocket_speed();
            let slider = egui::Slider::new(&mut speed, 0.0..=3.0)
                .step_by(0.1)
                .text("Thrust");
            if ui.add(slider).changed() {
                edits.rocket_speed = Some(speed);
            }
            ui.label(format!("Position: {}", vec3_label(game.rocket_position())));
        });
    });

    egui::Window::new("GameStats").show(ctx, |ui| {
        let mut time_scale = game.time_scale();
        ui.horizontal(|ui| {
            ui.label("Time scale");
            if ui
                .add(egui::DragValue::new(&mut time_scale).speed(0.1))
                .changed()
            {
                edits.time_scale = Some(time_scale);
            }
        });
        ui.label(format!("Time: {:.2}", game.time()));
        ui.label(format!("FPS: {:.0}", game.frame_rate()));

        ui.collapsing("Camera", |ui| {
            let (width, height) = game.screen_size();
            let camera = game.active_camera();
            ui.label(format!("Screen: {width} x {height}"));
            ui.label(format!("Eye: {}", vec3_label(camera.eye())));
            ui.label(format!("Name: {}", camera.name()));
        });

        ui.collapsing("Lights", |ui| {
            for slot in LightSlot::ALL {
                let Some(light) = game.light(slot) else {
                    continue;
                };
                ui.separator();
                ui.label(slot.label());
                ui.label(format!("Position: {}", vec3_label(light.position())));
                if matches!(slot, LightSlot::Sun | LightSlot::Moon) {
                    ui.label(format!("Orbit: {}", vec3_label(light.orbit_angles())));
                }
                let colour = light.colour();
                let mut rgb = colour.truncate().to_array();
                ui.horizontal(|ui| {
                    ui.label("Colour");
                    if ui.color_edit_button_rgb(&mut rgb).changed() {
                        edits
                            .light_colours
                            .push((slot, Vec3::from(rgb).extend(colour.w)));
                    }
                });
            }
        });
    });

    edits
}
