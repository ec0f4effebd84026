//! Fixed-function state chosen by a shape's [`RenderMode`].

use crate::shape::RenderMode;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Front faces are clockwise, matching the generated geometry.
pub const FRONT_FACE: wgpu::FrontFace = wgpu::FrontFace::Cw;

/// Blend, depth and cull settings for one pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineState {
    pub blend: Option<wgpu::BlendState>,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
    pub cull_mode: Option<wgpu::Face>,
}

impl PipelineState {
    pub fn for_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Blended => Self {
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                cull_mode: None,
            },
            RenderMode::Environment => Self {
                blend: None,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                cull_mode: None,
            },
            RenderMode::Opaque => Self {
                blend: None,
                depth_write: true,
                depth_compare: wgpu::CompareFunction::Less,
                cull_mode: Some(wgpu::Face::Back),
            },
        }
    }

    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: FRONT_FACE,
            cull_mode: self.cull_mode,
            ..Default::default()
        }
    }

    pub fn depth_stencil(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: self.depth_write,
            depth_compare: self.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blended_shapes_blend_without_writing_depth() {
        let state = PipelineState::for_mode(RenderMode::Blended);
        assert_eq!(state.blend, Some(wgpu::BlendState::ALPHA_BLENDING));
        assert!(!state.depth_write);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::LessEqual);
        assert_eq!(state.cull_mode, None);
    }

    #[test]
    fn environment_is_never_culled() {
        let state = PipelineState::for_mode(RenderMode::Environment);
        assert_eq!(state.blend, None);
        assert_eq!(state.cull_mode, None);
        assert!(!state.depth_write);
        assert_eq!(state.primitive().cull_mode, None);
    }

    #[test]
    fn opaque_is_the_default_state() {
        let state = PipelineState::for_mode(RenderMode::default());
        assert_eq!(state.blend, None);
        assert!(state.depth_write);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        assert_eq!(state.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(state.primitive().front_face, wgpu::FrontFace::Cw);
        assert_eq!(state.depth_stencil().format, DEPTH_FORMAT);
    }
}
