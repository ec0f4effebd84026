use crate::error::Result;
use crate::geometry::{GeometryKind, MeshData};
use crate::shape::{Instance, RenderMode};

/// GPU resource creation, as seen by [`ResourceCache`](super::ResourceCache).
///
/// The cache decides *when* something is created or rewritten; an
/// implementation only decides *how*. Each method is called at most once per
/// cache key, except [`write_instances`](Self::write_instances).
pub trait RenderDevice {
    type Geometry;
    type Texture;
    type Program;
    type Pipeline;
    type Material;
    type InstanceBuffer;

    fn create_geometry(&mut self, kind: GeometryKind, mesh: &MeshData) -> Result<Self::Geometry>;

    /// Loads the texture at `path`, relative to the asset root.
    fn load_texture(&mut self, path: &str) -> Result<Self::Texture>;

    /// Builds the shader program named by `key`.
    fn create_program(&mut self, key: &str) -> Result<Self::Program>;

    fn create_pipeline(
        &mut self,
        key: &str,
        program: &Self::Program,
        mode: RenderMode,
    ) -> Result<Self::Pipeline>;

    /// Binds up to three textures. `None` stages get a neutral default.
    fn create_material(
        &mut self,
        diffuse: Option<&Self::Texture>,
        normal: Option<&Self::Texture>,
        height: Option<&Self::Texture>,
    ) -> Result<Self::Material>;

    /// Allocates room for `capacity` instances and uploads `instances`.
    fn create_instance_buffer(
        &mut self,
        label: &str,
        instances: &[Instance],
        capacity: usize,
    ) -> Result<Self::InstanceBuffer>;

    /// Overwrites the start of an existing buffer. `instances` never exceeds
    /// the capacity the buffer was created with.
    fn write_instances(&mut self, buffer: &Self::InstanceBuffer, instances: &[Instance]);
}
