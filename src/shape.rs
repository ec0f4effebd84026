//! Drawable units: geometry, material, local transform and instances.

use glam::Vec3;

use crate::geometry::GeometryKind;
use crate::transform::Transform;

/// One repetition of a shape, offset in the shape's local space.
///
/// Equality is by value, which is what [`Shape::remove_instances`] matches on.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Instance {
    pub position: [f32; 3],
}

impl Instance {
    /// Vertex buffer layout for slot 1, stepped per instance.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Instance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 5,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Where this instance ends up under `world`.
    pub fn world_position(&self, world: glam::Mat4) -> Vec3 {
        world.transform_point3(self.position())
    }
}

/// `count` instances strung along local +Z, one unit apart.
///
/// Particle shaders use the z offset as a per-particle seed.
pub fn particle_line(count: u32) -> Vec<Instance> {
    (0..count)
        .map(|i| Instance::new(0.0, 0.0, i as f32))
        .collect()
}

/// Texture and shader identifiers for a shape.
///
/// An empty texture path means the stage is unused.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Material {
    pub diffuse: String,
    pub normal: String,
    pub height: String,
    pub shader: String,
}

impl Material {
    pub fn new(shader: impl Into<String>) -> Self {
        Self {
            shader: shader.into(),
            ..Default::default()
        }
    }

    pub fn diffuse(mut self, path: impl Into<String>) -> Self {
        self.diffuse = path.into();
        self
    }

    pub fn normal(mut self, path: impl Into<String>) -> Self {
        self.normal = path.into();
        self
    }

    pub fn height(mut self, path: impl Into<String>) -> Self {
        self.height = path.into();
        self
    }

    /// The texture triple, used as the material cache key.
    pub fn textures(&self) -> (&str, &str, &str) {
        (&self.diffuse, &self.normal, &self.height)
    }
}

/// How a shape is composited. Selects blend, depth and cull state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    #[default]
    Opaque,
    /// Alpha blended, depth tested but not written.
    Blended,
    /// Skybox: drawn from the inside, never culled.
    Environment,
}

/// A drawable unit owned by a [`GameObject`](crate::GameObject).
#[derive(Clone, Debug)]
pub struct Shape {
    name: String,
    geometry: GeometryKind,
    material: Material,
    transform: Transform,
    mode: RenderMode,
    instances: Vec<Instance>,
}

impl Shape {
    pub fn new(name: impl Into<String>, geometry: GeometryKind, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::new(),
            mode: RenderMode::Opaque,
            instances: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_instances(mut self, instances: Vec<Instance>) -> Self {
        self.instances = instances;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> GeometryKind {
        self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn is_blended(&self) -> bool {
        self.mode == RenderMode::Blended
    }

    pub fn is_environment(&self) -> bool {
        self.mode == RenderMode::Environment
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Instanced shapes are drawn once per instance; others once.
    pub fn is_instanced(&self) -> bool {
        !self.instances.is_empty()
    }

    pub fn add_instances(&mut self, instances: &[Instance]) {
        self.instances.extend_from_slice(instances);
    }

    /// Removes every instance equal to any entry of `to_remove`.
    ///
    /// All matches go, not just the first. Relative order of the survivors is
    /// preserved.
    pub fn remove_instances(&mut self, to_remove: &[Instance]) {
        if to_remove.is_empty() {
            return;
        }
        self.instances
            .retain(|instance| !to_remove.contains(instance));
    }

    pub fn set_instances(&mut self, instances: Vec<Instance>) {
        self.instances = instances;
    }

    /// Composes an Euler delta onto this shape's local rotation only.
    pub fn rotate(&mut self, delta: Vec3) {
        self.transform.rotate(delta);
    }

    pub fn set_rotation(&mut self, euler: Vec3) {
        self.transform.set_rotation(euler);
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.transform.translate(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(instances: Vec<Instance>) -> Shape {
        Shape::new("Cube", GeometryKind::Box, Material::new("default")).with_instances(instances)
    }

    #[test]
    fn instance_is_twelve_bytes() {
        assert_eq!(std::mem::size_of::<Instance>(), 12);
        assert_eq!(Instance::LAYOUT.array_stride, 12);
    }

    #[test]
    fn remove_single_instance_keeps_order() {
        let mut shape = cube(vec![
            Instance::new(0.0, 0.0, 0.0),
            Instance::new(0.0, 0.0, 1.0),
            Instance::new(0.0, 0.0, 2.0),
        ]);
        shape.remove_instances(&[Instance::new(0.0, 0.0, 1.0)]);
        assert_eq!(
            shape.instances(),
            &[Instance::new(0.0, 0.0, 0.0), Instance::new(0.0, 0.0, 2.0)]
        );
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let dup = Instance::new(1.0, 1.0, 1.0);
        let keep = Instance::new(2.0, 0.0, 0.0);
        let mut shape = cube(vec![dup, keep, dup, dup]);
        shape.remove_instances(&[dup]);
        assert_eq!(shape.instances(), &[keep]);
    }

    #[test]
    fn set_instances_restores_removed_set() {
        let original = vec![
            Instance::new(0.0, 0.0, 0.0),
            Instance::new(0.0, 0.0, 1.0),
            Instance::new(0.0, 0.0, 2.0),
        ];
        let mut shape = cube(original.clone());
        shape.remove_instances(&[Instance::new(0.0, 0.0, 1.0)]);
        assert_eq!(shape.instances().len(), 2);
        shape.set_instances(original.clone());
        assert_eq!(shape.instances(), original.as_slice());
    }

    #[test]
    fn removing_unknown_instances_is_a_no_op() {
        let mut shape = cube(vec![Instance::new(0.0, 0.0, 0.0)]);
        shape.remove_instances(&[Instance::new(5.0, 5.0, 5.0)]);
        shape.remove_instances(&[]);
        assert_eq!(shape.instances().len(), 1);
    }

    #[test]
    fn add_instances_appends() {
        let mut shape = cube(Vec::new());
        assert!(!shape.is_instanced());
        shape.add_instances(&particle_line(3));
        assert!(shape.is_instanced());
        assert_eq!(shape.instances()[2], Instance::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn rotation_is_local_to_the_shape() {
        let mut a = cube(Vec::new());
        let b = cube(Vec::new());
        a.rotate(Vec3::new(0.0, 0.0, 0.5));
        assert_ne!(a.transform().matrix(), b.transform().matrix());
        a.set_rotation(Vec3::ZERO);
        let (ma, mb) = (a.transform().matrix(), b.transform().matrix());
        assert!(ma.abs_diff_eq(mb, 1e-6));
    }

    #[test]
    fn mode_flags() {
        let skybox = cube(Vec::new()).with_mode(RenderMode::Environment);
        assert!(skybox.is_environment() && !skybox.is_blended());
        let smoke = cube(Vec::new()).with_mode(RenderMode::Blended);
        assert!(smoke.is_blended() && !smoke.is_environment());
    }
}
