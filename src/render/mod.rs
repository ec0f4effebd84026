//! Scene rendering.
//!
//! Each frame runs in two steps:
//!
//! 1. [`Renderer::prepare`] walks the snapshot, makes sure every geometry,
//!    texture, program, pipeline and material a shape names is cached,
//!    brings instance buffers up to date and uploads the uniform blocks.
//! 2. [`Renderer::draw_scene`] records one render pass that issues a draw per
//!    shape, in object order then shape order, against the cached resources.
//!
//! Nothing is created while recording, so a frame either fails during
//! `prepare` or draws completely.

pub mod cache;
pub mod device;
pub mod pipeline;
pub mod shaders;
pub mod uniforms;
pub mod wgpu_device;

pub use cache::{CacheStats, ResourceCache};
pub use device::RenderDevice;
pub use wgpu_device::WgpuDevice;

use std::num::NonZeroU64;

use glam::Mat4;

use crate::config::AssetsSection;
use crate::error::Result;
use crate::game::FrameSnapshot;
use crate::geometry::GeometryKind;
use crate::gpu::GpuContext;
use crate::object::GameObject;
use crate::shape::{Instance, Material, RenderMode};
use uniforms::{DRAW_UNIFORM_STRIDE, DrawUniforms, FrameUniforms, LightUniforms, pack_draws};

/// Cornflower blue.
pub const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.392,
    g: 0.584,
    b: 0.929,
    a: 1.0,
};

const INITIAL_DRAW_CAPACITY: usize = 16;

/// One shape's draw for this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub object: String,
    pub shape: String,
    pub geometry: GeometryKind,
    pub material: Material,
    pub mode: RenderMode,
    pub world: Mat4,
}

/// Flattens the object list into draws, preserving object then shape order.
pub fn build_commands(objects: &[GameObject]) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    for object in objects {
        for (shape, world) in object.shapes_with_world() {
            commands.push(DrawCommand {
                object: object.name().to_owned(),
                shape: shape.name().to_owned(),
                geometry: shape.geometry(),
                material: shape.material().clone(),
                mode: shape.mode(),
                world,
            });
        }
    }
    commands
}

pub struct Renderer {
    cache: ResourceCache<WgpuDevice>,
    frame_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: usize,
    /// A single zero offset, bound in slot 1 for shapes without instances.
    single_instance: wgpu::Buffer,
    commands: Vec<DrawCommand>,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, assets: AssetsSection) -> Self {
        use wgpu::util::DeviceExt;

        let device = WgpuDevice::new(gpu, assets);

        let frame_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniforms"),
            size: std::mem::size_of::<LightUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: device.frame_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        let (draw_buffer, draw_bind_group) =
            create_draw_buffer(&gpu.device, device.draw_layout(), INITIAL_DRAW_CAPACITY);

        let single_instance = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Single Instance"),
                contents: bytemuck::bytes_of(&Instance::new(0.0, 0.0, 0.0)),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Self {
            cache: ResourceCache::new(device),
            frame_buffer,
            light_buffer,
            frame_bind_group,
            draw_buffer,
            draw_bind_group,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            single_instance,
            commands: Vec::new(),
        }
    }

    /// Resolves every resource the snapshot needs and uploads this frame's
    /// uniforms and instance data.
    pub fn prepare(&mut self, gpu: &GpuContext, snapshot: &FrameSnapshot) -> Result<()> {
        let frame = FrameUniforms::new(snapshot.camera, snapshot.scaled_time);
        gpu.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));
        let lights = LightUniforms::new(snapshot.lights);
        gpu.queue
            .write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&lights));

        for object in snapshot.objects {
            for shape in object.shapes() {
                self.cache.ensure_geometry(shape.geometry())?;
                self.cache.ensure_material(shape.material())?;
                self.cache
                    .ensure_pipeline(&shape.material().shader, shape.mode())?;
                // once instanced, a shape keeps drawing per instance even at zero
                let cached = self.cache.instances(object.name(), shape.name());
                if shape.is_instanced() || cached.is_some() {
                    self.cache
                        .sync_instances(object.name(), shape.name(), shape.instances())?;
                }
            }
        }

        self.commands = build_commands(snapshot.objects);
        let draws: Vec<DrawUniforms> = self
            .commands
            .iter()
            .map(|command| DrawUniforms::new(command.world))
            .collect();
        self.ensure_draw_capacity(gpu, draws.len());
        if !draws.is_empty() {
            gpu.queue
                .write_buffer(&self.draw_buffer, 0, &pack_draws(&draws));
        }

        log::trace!("Prepared {} draws", self.commands.len());
        Ok(())
    }

    fn ensure_draw_capacity(&mut self, gpu: &GpuContext, count: usize) {
        if count <= self.draw_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let layout = self.cache.device().draw_layout();
        let (buffer, bind_group) = create_draw_buffer(&gpu.device, layout, capacity);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = capacity;
        log::debug!("Grew draw uniform buffer to {capacity} draws");
    }

    /// Records the scene pass into `encoder`: clear, then one draw per shape.
    pub fn draw_scene(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        for (i, command) in self.commands.iter().enumerate() {
            let (Some(pipeline), Some(material), Some(geometry)) = (
                self.cache.pipeline(&command.material.shader, command.mode),
                self.cache.material(&command.material),
                self.cache.geometry(command.geometry),
            ) else {
                log::warn!(
                    "Skipping {}/{}: not prepared",
                    command.object,
                    command.shape
                );
                continue;
            };

            let instances = self.cache.instances(&command.object, &command.shape);
            let (instance_buffer, instance_count) = match instances {
                Some(entry) => (&entry.buffer, entry.count() as u32),
                None => (&self.single_instance, 1),
            };
            if instance_count == 0 {
                continue;
            }

            let offset = (i as u64 * DRAW_UNIFORM_STRIDE) as u32;
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
            render_pass.set_bind_group(2, material, &[]);
            render_pass.set_vertex_buffer(0, geometry.buffers.vertex.slice(..));
            render_pass.set_vertex_buffer(1, instance_buffer.slice(..));
            render_pass
                .set_index_buffer(geometry.buffers.index.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..geometry.index_count, 0, 0..instance_count);
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Releases every cached GPU resource.
    pub fn cleanup(&mut self) -> CacheStats {
        self.commands.clear();
        self.cache.cleanup()
    }
}

fn create_draw_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniforms"),
        size: capacity as u64 * DRAW_UNIFORM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use crate::transform::Transform;
    use glam::Vec3;

    fn scene() -> Vec<GameObject> {
        let mut sky = GameObject::new("Environment");
        sky.add_shape(
            Shape::new(
                "Skybox",
                GeometryKind::Box,
                Material::new("environment").diffuse("desertSkybox.dds"),
            )
            .with_mode(RenderMode::Environment),
        );

        let origin = Vec3::new(-60.0, 3.0, 0.0);
        let mut rocket = GameObject::new("Rocket")
            .with_transform(Transform::new().with_translation(origin));
        rocket.add_shape(Shape::new(
            "RocketBody",
            GeometryKind::Cylinder,
            Material::new("parallax"),
        ));
        let cone = Shape::new("RocketCone", GeometryKind::Cone, Material::new("chrome"))
            .with_transform(Transform::new().with_translation(Vec3::new(0.0, 3.0, 0.0)));
        rocket.add_shape(cone);
        vec![sky, rocket]
    }

    #[test]
    fn commands_follow_object_then_shape_order() {
        let commands = build_commands(&scene());
        let names: Vec<_> = commands
            .iter()
            .map(|c| (c.object.as_str(), c.shape.as_str()))
            .collect();
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], ("Environment", "Skybox"));
        assert_eq!(names[1], ("Rocket", "RocketBody"));
        assert_eq!(names[2], ("Rocket", "RocketCone"));
        assert_eq!(commands[0].mode, RenderMode::Environment);
        assert_eq!(commands[2].geometry, GeometryKind::Cone);
    }

    #[test]
    fn command_world_is_object_times_local() {
        let commands = build_commands(&scene());
        let cone = commands[2].world.w_axis.truncate();
        assert!(cone.abs_diff_eq(Vec3::new(-60.0, 6.0, 0.0), 1e-5));
    }

    #[test]
    fn empty_scene_has_no_commands() {
        assert!(build_commands(&[]).is_empty());
        assert!(build_commands(&[GameObject::new("Empty")]).is_empty());
    }
}
