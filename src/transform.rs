//! Scale, rotation and translation composed into a world matrix.
//!
//! [`Transform`] is the node every scene element is built on: shapes, game
//! objects and lights all carry one. Rotation is stored as a unit quaternion,
//! but the mutators take Euler deltas in radians so call sites read the same as
//! an additive angle API:
//!
//! ```
//! use rocket_demo::Transform;
//! use glam::Vec3;
//!
//! let mut t = Transform::new()
//!     .with_translation(Vec3::new(0.0, 3.0, 0.0))
//!     .with_scale(Vec3::new(0.5, 5.0, 0.5));
//!
//! t.rotate(Vec3::new(0.0, 0.0, -0.1));
//! t.translate(t.up() * 2.0);
//! assert_eq!(t.position(), t.matrix().w_axis.truncate());
//! ```
//!
//! # Composition
//!
//! The world matrix is `T * R * S` (column vectors), so a point is scaled,
//! then rotated, then translated. Euler angles map to `Rz * Ry * Rx`, which
//! applies X first, then Y, then Z.
//!
//! Derived vectors (`right`, `up`, `forward`, `position`) are recomputed on
//! every mutation; a `Transform` never exposes stale state.

use glam::{Mat4, Quat, Vec3};

/// Builds the quaternion for Euler angles applied in X, Y, Z order.
pub fn euler_to_quat(euler: Vec3) -> Quat {
    Quat::from_rotation_z(euler.z) * Quat::from_rotation_y(euler.y) * Quat::from_rotation_x(euler.x)
}

/// A scale-rotate-translate node with eagerly derived basis vectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
    matrix: Mat4,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_parts(Vec3::ONE, Quat::IDENTITY, Vec3::ZERO)
    }
}

impl Transform {
    /// Identity transform: unit scale, no rotation, at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transform from explicit components.
    pub fn from_parts(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        let mut transform = Self {
            scale,
            rotation,
            translation,
            matrix: Mat4::IDENTITY,
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::Z,
        };
        transform.recompute();
        transform
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self.recompute();
        self
    }

    /// Sets the rotation from Euler angles in radians.
    pub fn with_rotation(mut self, euler: Vec3) -> Self {
        self.rotation = euler_to_quat(euler);
        self.recompute();
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self.recompute();
        self
    }

    /// Adds `delta` to the translation.
    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
        self.recompute();
    }

    /// Composes a rotation given as Euler deltas (radians) onto the current one.
    ///
    /// The delta is applied in the parent frame, after the existing rotation.
    /// Rotations about a single axis accumulate exactly like summed angles.
    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation = (euler_to_quat(delta) * self.rotation).normalize();
        self.recompute();
    }

    /// Adds `delta` to each scale factor.
    pub fn scale_by(&mut self, delta: Vec3) {
        self.scale += delta;
        self.recompute();
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.recompute();
    }

    /// Overwrites the rotation with Euler angles in radians.
    pub fn set_rotation(&mut self, euler: Vec3) {
        self.rotation = euler_to_quat(euler);
        self.recompute();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.recompute();
    }

    /// Back to identity scale, zero rotation and the origin.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// World position: the translation column of the matrix.
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    fn recompute(&mut self) {
        self.matrix =
            Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
        self.right = self.matrix.x_axis.truncate().normalize_or_zero();
        self.up = self.matrix.y_axis.truncate().normalize_or_zero();
        self.forward = self.matrix.z_axis.truncate().normalize_or_zero();
    }
}
