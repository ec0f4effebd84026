//! Point lights with an orbit stage for the day/night cycle.
//!
//! A light's matrix is built in five steps, innermost first:
//!
//! 1. scale
//! 2. local rotation
//! 3. orbit offset (the radius of the orbit)
//! 4. orbit rotation
//! 5. world translation (the orbit pivot)
//!
//! so the light sits `orbit_offset` away from its pivot, swung around the
//! pivot by the orbit rotation. [`Light::orbit`] only advances step 4.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::transform::euler_to_quat;

/// RGBA with opaque alpha.
pub fn rgb(r: f32, g: f32, b: f32) -> Vec4 {
    Vec4::new(r, g, b, 1.0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    name: String,
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
    orbit: Quat,
    orbit_angles: Vec3,
    orbit_offset: Vec3,
    colour: Vec4,
    matrix: Mat4,
}

impl Light {
    /// A light at `translation` with no orbit.
    pub fn new(name: impl Into<String>, translation: Vec3, colour: Vec4) -> Self {
        let mut light = Self {
            name: name.into(),
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            translation,
            orbit: Quat::IDENTITY,
            orbit_angles: Vec3::ZERO,
            orbit_offset: Vec3::ZERO,
            colour,
            matrix: Mat4::IDENTITY,
        };
        light.recompute();
        light
    }

    /// A light circling `pivot` at `offset`.
    pub fn orbiting(name: impl Into<String>, pivot: Vec3, offset: Vec3, colour: Vec4) -> Self {
        let mut light = Self::new(name, pivot, colour);
        light.orbit_offset = offset;
        light.recompute();
        light
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Advances the orbit rotation by Euler deltas in radians.
    pub fn orbit(&mut self, delta: Vec3) {
        self.orbit = (euler_to_quat(delta) * self.orbit).normalize();
        self.orbit_angles += delta;
        self.recompute();
    }

    /// Moves the orbit offset relative to the pivot.
    pub fn orbit_translate(&mut self, delta: Vec3) {
        self.orbit_offset += delta;
        self.recompute();
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
        self.recompute();
    }

    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation = (euler_to_quat(delta) * self.rotation).normalize();
        self.recompute();
    }

    pub fn scale_by(&mut self, delta: Vec3) {
        self.scale += delta;
        self.recompute();
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.recompute();
    }

    pub fn set_colour(&mut self, colour: Vec4) {
        self.colour = colour;
    }

    pub fn colour(&self) -> Vec4 {
        self.colour
    }

    /// Accumulated orbit angles, for display.
    pub fn orbit_angles(&self) -> Vec3 {
        self.orbit_angles
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    fn recompute(&mut self) {
        self.matrix = Mat4::from_translation(self.translation)
            * Mat4::from_quat(self.orbit)
            * Mat4::from_translation(self.orbit_offset)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_scale(self.scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn static_light_sits_at_its_translation() {
        let light = Light::new("Engine", Vec3::new(1.0, 2.0, 3.0), rgb(0.4, 0.1, 0.1));
        assert_eq!(light.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn orbit_rotates_the_offset_around_the_pivot() {
        let pivot = Vec3::new(5.0, 0.0, 0.0);
        let mut sun = Light::orbiting("Sun", pivot, Vec3::new(0.0, 85.0, 0.0), rgb(0.6, 0.4, 0.1));
        assert!(sun.position().abs_diff_eq(Vec3::new(5.0, 85.0, 0.0), 1e-4));

        // theta = -0.05 with time scale 1 and dt 1
        let theta = -0.05_f32;
        sun.orbit(Vec3::new(0.0, 0.0, theta));
        let expected = pivot + Quat::from_rotation_z(theta) * Vec3::new(0.0, 85.0, 0.0);
        assert!(sun.position().abs_diff_eq(expected, 1e-4));

        // the opposite order would rotate the pivot and leave the offset unrotated
        let wrong = Quat::from_rotation_z(theta) * pivot + Vec3::new(0.0, 85.0, 0.0);
        assert!(!sun.position().abs_diff_eq(wrong, 1e-3));
    }

    fn orbiting(height: f32) -> Light {
        let offset = Vec3::new(0.0, height, 0.0);
        Light::orbiting("Orbiter", Vec3::ZERO, offset, rgb(1.0, 1.0, 1.0))
    }

    #[test]
    fn quarter_orbit_puts_the_sun_on_the_horizon() {
        let mut sun = orbiting(10.0);
        sun.orbit(Vec3::new(0.0, 0.0, -FRAC_PI_2));
        let horizon = Vec3::new(10.0, 0.0, 0.0);
        assert!(sun.position().abs_diff_eq(horizon, 1e-4));
        assert!((sun.orbit_angles().z + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn local_rotation_does_not_move_the_light() {
        let mut light = orbiting(-10.0);
        let before = light.position();
        light.rotate(Vec3::new(0.3, 0.2, 0.1));
        assert!(light.position().abs_diff_eq(before, 1e-5));
    }

    #[test]
    fn orbit_translate_changes_radius() {
        let mut light = orbiting(10.0);
        light.orbit_translate(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(light.position(), Vec3::new(0.0, 15.0, 0.0));
    }
}
