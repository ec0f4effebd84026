//! Game objects: an ordered list of shapes under one shared transform.
//!
//! A shape's world matrix is the object transform applied after the shape's
//! local transform (`object * local`), so rotating the object swings every
//! shape around the object origin while rotating a shape only turns that
//! shape.
//!
//! Shapes are addressed through the [`ShapeId`] handle returned by
//! [`GameObject::add_shape`] instead of bare positions:
//!
//! ```
//! use rocket_demo::{GameObject, GeometryKind, Material, Shape};
//! use glam::Vec3;
//!
//! let mut launcher = GameObject::new("Launcher");
//! let _base = launcher.add_shape(Shape::new("Base", GeometryKind::Box, Material::new("default")));
//! let pole = launcher.add_shape(Shape::new("Pole", GeometryKind::Box, Material::new("default")));
//!
//! launcher.rotate_shape(pole, Vec3::new(0.0, 0.0, 0.1));
//! assert_eq!(launcher.shape_id("Pole"), Some(pole));
//! ```

use glam::{Mat4, Vec3};

use crate::shape::{Instance, Shape};
use crate::transform::Transform;

/// Handle to a shape inside the [`GameObject`] that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeId(usize);

impl ShapeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named, ordered collection of shapes sharing one transform.
#[derive(Clone, Debug)]
pub struct GameObject {
    name: String,
    transform: Transform,
    shapes: Vec<Shape>,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::new(),
            shapes: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Appends a shape and returns its handle. Handles stay valid for the
    /// object's lifetime; shapes are never removed.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.shapes.push(shape);
        ShapeId(self.shapes.len() - 1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Looks a shape up by display name.
    pub fn shape_id(&self, name: &str) -> Option<ShapeId> {
        self.shapes
            .iter()
            .position(|s| s.name() == name)
            .map(ShapeId)
    }

    /// # Panics
    ///
    /// Panics if `id` was not returned by this object's `add_shape`.
    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` was not returned by this object's `add_shape`.
    pub fn shape_mut(&mut self, id: ShapeId) -> &mut Shape {
        &mut self.shapes[id.0]
    }

    /// World matrix for one of this object's shapes.
    pub fn shape_world(&self, id: ShapeId) -> Mat4 {
        self.transform.matrix() * self.shape(id).transform().matrix()
    }

    /// Every shape in draw order, paired with its world matrix.
    pub fn shapes_with_world(&self) -> impl Iterator<Item = (&Shape, Mat4)> + '_ {
        let object = self.transform.matrix();
        self.shapes
            .iter()
            .map(move |shape| (shape, object * shape.transform().matrix()))
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.transform.translate(delta);
    }

    pub fn rotate(&mut self, delta: Vec3) {
        self.transform.rotate(delta);
    }

    pub fn scale_by(&mut self, delta: Vec3) {
        self.transform.scale_by(delta);
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform.set_translation(translation);
    }

    /// Identity scale, zero rotation, origin. Shapes are left untouched.
    pub fn reset(&mut self) {
        self.transform.reset();
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn up(&self) -> Vec3 {
        self.transform.up()
    }

    pub fn rotate_shape(&mut self, id: ShapeId, delta: Vec3) {
        self.shape_mut(id).rotate(delta);
    }

    pub fn set_shape_rotation(&mut self, id: ShapeId, euler: Vec3) {
        self.shape_mut(id).set_rotation(euler);
    }

    pub fn remove_instances_from_shape(&mut self, id: ShapeId, to_remove: &[Instance]) {
        self.shape_mut(id).remove_instances(to_remove);
    }

    pub fn set_shape_instances(&mut self, id: ShapeId, instances: Vec<Instance>) {
        self.shape_mut(id).set_instances(instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryKind;
    use crate::shape::Material;
    use std::f32::consts::FRAC_PI_2;

    fn rocket() -> (GameObject, ShapeId, ShapeId) {
        let origin = Vec3::new(-60.0, 3.0, 0.0);
        let mut rocket = GameObject::new("Rocket")
            .with_transform(Transform::new().with_translation(origin));

        let parallax = Material::new("parallax");
        let body = Shape::new("RocketBody", GeometryKind::Cylinder, parallax)
            .with_transform(Transform::new().with_scale(Vec3::new(0.5, 5.0, 0.5)));
        let cone_transform = Transform::new()
            .with_scale(Vec3::new(0.75, 2.0, 0.75))
            .with_translation(Vec3::new(0.0, 3.0, 0.0));
        let cone = Shape::new("RocketCone", GeometryKind::Cone, Material::new("chrome"))
            .with_transform(cone_transform);

        let body = rocket.add_shape(body);
        let cone = rocket.add_shape(cone);
        (rocket, body, cone)
    }

    #[test]
    fn handles_follow_insertion_order() {
        let (rocket, body, cone) = rocket();
        assert_eq!(body.index(), 0);
        assert_eq!(cone.index(), 1);
        assert_eq!(rocket.shape(cone).name(), "RocketCone");
        assert_eq!(rocket.shape_id("RocketBody"), Some(body));
        assert_eq!(rocket.shape_id("Missing"), None);
    }

    #[test]
    fn shape_world_composes_object_after_local() {
        let (mut rocket, _, cone) = rocket();
        let tip = rocket.shape_world(cone).w_axis.truncate();
        assert!(tip.abs_diff_eq(Vec3::new(-60.0, 6.0, 0.0), 1e-5));

        // tipping the object over swings the cone around the object origin
        rocket.rotate(Vec3::new(0.0, 0.0, -FRAC_PI_2));
        let tip = rocket.shape_world(cone).w_axis.truncate();
        assert!(tip.abs_diff_eq(Vec3::new(-57.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn shapes_with_world_matches_handles() {
        let (rocket, body, cone) = rocket();
        let worlds: Vec<_> = rocket.shapes_with_world().map(|(_, world)| world).collect();
        let expected = [rocket.shape_world(body), rocket.shape_world(cone)];
        assert_eq!(worlds, expected);
    }

    #[test]
    fn reset_keeps_shapes() {
        let (mut rocket, _, cone) = rocket();
        rocket.translate(Vec3::new(1.0, 2.0, 3.0));
        rocket.reset();
        assert_eq!(rocket.position(), Vec3::ZERO);
        assert_eq!(rocket.shapes().len(), 2);
        assert_eq!(
            rocket.shape(cone).transform().translation(),
            Vec3::new(0.0, 3.0, 0.0)
        );
    }

    #[test]
    fn shape_rotation_leaves_siblings_alone() {
        let (mut rocket, body, cone) = rocket();
        let before = *rocket.shape(body).transform();
        rocket.rotate_shape(cone, Vec3::new(0.0, 0.0, 0.3));
        assert_eq!(*rocket.shape(body).transform(), before);
        rocket.set_shape_rotation(cone, Vec3::ZERO);
        assert!(
            rocket
                .shape(cone)
                .transform()
                .rotation()
                .abs_diff_eq(glam::Quat::IDENTITY, 1e-6)
        );
    }

    #[test]
    fn instance_accessors_route_to_the_shape() {
        let mut terrain = GameObject::new("Terrain");
        let grid = vec![Instance::new(0.0, 0.0, 0.0), Instance::new(1.0, 0.0, 0.0)];
        let cubes = Shape::new("TerrainCube", GeometryKind::Box, Material::new("default"))
            .with_instances(grid);
        let cubes = terrain.add_shape(cubes);
        terrain.remove_instances_from_shape(cubes, &[Instance::new(1.0, 0.0, 0.0)]);
        assert_eq!(terrain.shape(cubes).instances().len(), 1);
        terrain.set_shape_instances(cubes, Vec::new());
        assert!(!terrain.shape(cubes).is_instanced());
    }

    #[test]
    #[should_panic]
    fn foreign_handle_out_of_range_panics() {
        let (_, _, cone) = rocket();
        let empty = GameObject::new("Empty");
        let _ = empty.shape(cone);
    }
}
