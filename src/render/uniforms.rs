//! Uniform blocks shared with every WGSL program.
//!
//! Layouts follow WGSL uniform rules: every struct is a multiple of 16 bytes
//! and `vec3` members are padded out by the scalar that follows them.
//! Matrices are stored column-major, the order `glam` already uses.

use glam::Mat4;

use crate::camera::Camera;
use crate::light::Light;

/// The light block holds at most this many lights; extras are ignored.
pub const MAX_LIGHTS: usize = 4;

/// Per-draw blocks live in one buffer at this stride, addressed with a
/// dynamic offset. 256 is wgpu's default `min_uniform_buffer_offset_alignment`.
pub const DRAW_UNIFORM_STRIDE: u64 = 256;

/// Group 0, binding 0: camera and clock.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub eye: [f32; 3],
    /// Elapsed time multiplied by the time scale.
    pub time: f32,
}

impl FrameUniforms {
    pub fn new(camera: &Camera, scaled_time: f32) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            proj: camera.projection().to_cols_array_2d(),
            eye: camera.eye().to_array(),
            time: scaled_time,
        }
    }
}

/// Group 0, binding 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniforms {
    pub positions: [[f32; 4]; MAX_LIGHTS],
    pub colours: [[f32; 4]; MAX_LIGHTS],
    pub count: u32,
    pub _pad: [u32; 3],
}

impl LightUniforms {
    pub fn new(lights: &[Light]) -> Self {
        let mut block = Self::zeroed();
        for (i, light) in lights.iter().take(MAX_LIGHTS).enumerate() {
            block.positions[i] = light.position().extend(1.0).to_array();
            block.colours[i] = light.colour().to_array();
        }
        block.count = lights.len().min(MAX_LIGHTS) as u32;
        block
    }

    fn zeroed() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

/// Group 1, binding 0, one per draw.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub world: [[f32; 4]; 4],
}

impl DrawUniforms {
    pub fn new(world: Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
        }
    }
}

/// Packs draw blocks at [`DRAW_UNIFORM_STRIDE`] so each can be bound by offset.
pub fn pack_draws(draws: &[DrawUniforms]) -> Vec<u8> {
    let stride = DRAW_UNIFORM_STRIDE as usize;
    let mut bytes = vec![0u8; draws.len() * stride];
    for (i, draw) in draws.iter().enumerate() {
        let block = bytemuck::bytes_of(draw);
        bytes[i * stride..i * stride + block.len()].copy_from_slice(block);
    }
    bytes
}
