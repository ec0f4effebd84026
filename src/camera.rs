//! Fixed look-at and free-fly cameras.
//!
//! Every camera carries an eye position and an orientation basis. What it
//! looks at depends on its [`CameraMode`], which is fixed at construction:
//!
//! - [`CameraMode::Fixed`]: looks at an explicit target set with
//!   [`Camera::look_at`]. The controller uses this to attach cameras to the
//!   rocket each frame.
//! - [`CameraMode::FreeFly`]: looks along its own forward vector and responds
//!   to [`Camera::rotate`] and [`Camera::translate`].
//!
//! View and projection are left-handed with a `0..1` depth range, matching
//! wgpu's clip space.

use glam::{Mat3, Mat4, Quat, Vec3};

pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_2;
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    Fixed,
    FreeFly,
}

#[derive(Clone, Debug)]
pub struct Camera {
    name: String,
    mode: CameraMode,
    eye: Vec3,
    target: Vec3,
    orientation: Quat,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Creates a camera at `eye` whose basis is pitched by `rotation.x` and
    /// then yawed by `rotation.y` (radians).
    pub fn new(
        name: impl Into<String>,
        mode: CameraMode,
        eye: Vec3,
        rotation: Vec3,
        width: f32,
        height: f32,
    ) -> Self {
        let orientation = Quat::from_rotation_y(rotation.y) * Quat::from_rotation_x(rotation.x);
        let mut camera = Self {
            name: name.into(),
            mode,
            eye,
            target: Vec3::ZERO,
            orientation,
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::Z,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.resize(width, height);
        camera.update_basis();
        camera
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn is_controllable(&self) -> bool {
        self.mode == CameraMode::FreeFly
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
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

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Rebuilds the projection for a new viewport size.
    pub fn resize(&mut self, width: f32, height: f32) {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        self.projection = Mat4::perspective_lh(FOV_Y, aspect, Z_NEAR, Z_FAR);
    }

    /// Moves the eye. Allowed in either mode.
    pub fn set_eye(&mut self, eye: Vec3) {
        self.eye = eye;
        self.update_view();
    }

    /// Sets the look-at target. Only fixed cameras use it for their view.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        self.update_view();
    }

    /// Pitches about the camera's right axis by `delta.x`, then yaws about
    /// world Y by `delta.y`. Ignored by fixed cameras.
    pub fn rotate(&mut self, delta: Vec3) {
        if !self.is_controllable() {
            return;
        }
        let pitch = Quat::from_axis_angle(self.right, delta.x);
        let yaw = Quat::from_rotation_y(delta.y);
        self.orientation = (yaw * pitch * self.orientation).normalize();
        self.update_basis();
    }

    /// Moves the eye by a world-space delta. Ignored by fixed cameras.
    pub fn translate(&mut self, delta: Vec3) {
        if !self.is_controllable() {
            return;
        }
        self.eye += delta;
        self.update_view();
    }

    fn update_basis(&mut self) {
        let basis = Mat3::from_quat(self.orientation);
        self.right = basis.x_axis.normalize();
        self.up = basis.y_axis.normalize();
        self.forward = basis.z_axis.normalize();
        self.update_view();
    }

    fn update_view(&mut self) {
        self.view = match self.mode {
            CameraMode::Fixed => Mat4::look_at_lh(self.eye, self.target, self.up),
            CameraMode::FreeFly => Mat4::look_at_lh(self.eye, self.eye + self.forward, self.up),
        };
    }
}
