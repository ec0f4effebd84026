//! [`RenderDevice`] over wgpu.
//!
//! Owns the three bind group layouts every program shares:
//!
//! | Group | Binding | Contents                                     |
//! |-------|---------|----------------------------------------------|
//! | 0     | 0       | [`FrameUniforms`]                            |
//! | 0     | 1       | [`LightUniforms`]                            |
//! | 1     | 0       | [`DrawUniforms`], dynamic offset per draw    |
//! | 2     | 0..=2   | diffuse, normal and height textures          |
//! | 2     | 3       | sampler                                      |
//!
//! Missing material stages are bound to 1x1 defaults so every program can
//! sample all three.

use std::num::NonZeroU64;

use wgpu::util::DeviceExt;

use crate::config::AssetsSection;
use crate::error::{Error, Result};
use crate::geometry::{GeometryKind, MeshData, Vertex};
use crate::gpu::GpuContext;
use crate::shape::{Instance, RenderMode};
use crate::texture::Texture;

use super::device::RenderDevice;
use super::pipeline::PipelineState;
use super::shaders::embedded_shader;
use super::uniforms::{DrawUniforms, FrameUniforms, LightUniforms};

pub struct GeometryBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
}

pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    assets: AssetsSection,
    frame_layout: wgpu::BindGroupLayout,
    draw_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    white: Texture,
    flat_normal: Texture,
    flat_height: Texture,
}

impl WgpuDevice {
    pub fn new(gpu: &GpuContext, assets: AssetsSection) -> Self {
        let device = &gpu.device;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<FrameUniforms>() as u64, false),
                uniform_entry(1, std::mem::size_of::<LightUniforms>() as u64, false),
            ],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[uniform_entry(
                0,
                std::mem::size_of::<DrawUniforms>() as u64,
                true,
            )],
        });

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &material_layout],
            push_constant_ranges: &[],
        });

        Self {
            white: Texture::white(device, &gpu.queue),
            flat_normal: Texture::flat_normal(device, &gpu.queue),
            flat_height: Texture::flat_height(device, &gpu.queue),
            device: device.clone(),
            queue: gpu.queue.clone(),
            surface_format: gpu.config.format,
            assets,
            frame_layout,
            draw_layout,
            material_layout,
            pipeline_layout,
        }
    }

    pub fn frame_layout(&self) -> &wgpu::BindGroupLayout {
        &self.frame_layout
    }

    pub fn draw_layout(&self) -> &wgpu::BindGroupLayout {
        &self.draw_layout
    }

    fn shader_source(&self, key: &str) -> Result<String> {
        if let Some(source) = embedded_shader(key) {
            return Ok(source.to_owned());
        }
        std::fs::read_to_string(key).map_err(|err| {
            log::error!("Shader {key} is not built in and could not be read: {err}");
            Error::Shader(key.to_owned())
        })
    }
}

fn uniform_entry(binding: u32, size: u64, dynamic: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

impl RenderDevice for WgpuDevice {
    type Geometry = GeometryBuffers;
    type Texture = Texture;
    type Program = wgpu::ShaderModule;
    type Pipeline = wgpu::RenderPipeline;
    type Material = wgpu::BindGroup;
    type InstanceBuffer = wgpu::Buffer;

    fn create_geometry(&mut self, kind: GeometryKind, mesh: &MeshData) -> Result<GeometryBuffers> {
        let vertex = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertices", kind.label())),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Indices", kind.label())),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Ok(GeometryBuffers { vertex, index })
    }

    fn load_texture(&mut self, path: &str) -> Result<Texture> {
        let file = self.assets.resolve(path);
        Ok(Texture::load_or_substitute(
            &self.device,
            &self.queue,
            &file,
            path,
        ))
    }

    fn create_program(&mut self, key: &str) -> Result<wgpu::ShaderModule> {
        let source = self.shader_source(key)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(key),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            log::error!("Shader {key} failed to compile: {err}");
            return Err(Error::Shader(key.to_owned()));
        }
        Ok(module)
    }

    fn create_pipeline(
        &mut self,
        key: &str,
        program: &wgpu::ShaderModule,
        mode: RenderMode,
    ) -> Result<wgpu::RenderPipeline> {
        let state = PipelineState::for_mode(mode);

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{key} Pipeline ({mode:?})")),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: program,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::LAYOUT, Instance::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: program,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: state.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: state.primitive(),
                depth_stencil: Some(state.depth_stencil()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            log::error!("Pipeline for shader {key} is invalid: {err}");
            return Err(Error::Shader(key.to_owned()));
        }
        Ok(pipeline)
    }

    fn create_material(
        &mut self,
        diffuse: Option<&Texture>,
        normal: Option<&Texture>,
        height: Option<&Texture>,
    ) -> Result<wgpu::BindGroup> {
        let diffuse = diffuse.unwrap_or(&self.white);
        let normal = normal.unwrap_or(&self.flat_normal);
        let height = height.unwrap_or(&self.flat_height);

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&height.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
            ],
        }))
    }

    fn create_instance_buffer(
        &mut self,
        label: &str,
        instances: &[Instance],
        capacity: usize,
    ) -> Result<wgpu::Buffer> {
        let stride = std::mem::size_of::<Instance>() as u64;
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity.max(1) as u64 * stride,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.write_instances(&buffer, instances);
        Ok(buffer)
    }

    fn write_instances(&mut self, buffer: &wgpu::Buffer, instances: &[Instance]) {
        if !instances.is_empty() {
            self.queue
                .write_buffer(buffer, 0, bytemuck::cast_slice(instances));
        }
    }
}
