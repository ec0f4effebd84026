//! # Rocket Demo
//!
//! A rocket launches from a pad, arcs over a field of instanced terrain cubes
//! and explodes on impact, carving a crater and throwing particles, while a
//! sun and moon orbit the scene.
//!
//! The crate splits into a GPU-free scene layer and a wgpu render layer:
//!
//! - [`Transform`], [`Shape`], [`GameObject`], [`Light`] and [`Camera`] make up
//!   the scene graph.
//! - [`Game`] owns the scene and advances it once per frame from an [`Input`]
//!   snapshot.
//! - [`Renderer`] turns a [`FrameSnapshot`] into draws, creating GPU
//!   resources on first use and caching them for the rest of the session.
//!
//! ```no_run
//! use rocket_demo::GameConfig;
//!
//! fn main() -> rocket_demo::Result<()> {
//!     let config = GameConfig::load(None)?;
//!     rocket_demo::run(config)
//! }
//! ```

mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
mod gpu;
pub mod input;
pub mod light;
pub mod object;
mod overlay;
pub mod render;
pub mod shape;
mod texture;
pub mod transform;

pub use app::run;
pub use camera::{Camera, CameraMode};
pub use config::GameConfig;
pub use error::{Error, Result};
pub use game::{CameraSlot, FrameSnapshot, Game, LightSlot, ObjectSlot};
pub use geometry::{GeometryKind, MeshData, Vertex};
pub use gpu::GpuContext;
pub use input::Input;
pub use light::Light;
pub use object::{GameObject, ShapeId};
pub use render::Renderer;
pub use shape::{Instance, Material, RenderMode, Shape};
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::keyboard::KeyCode;
