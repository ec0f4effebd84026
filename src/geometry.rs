//! Procedural primitive geometry.
//!
//! Four fixed primitive kinds are generated on demand by [`generate`]: a unit
//! box, a 50-segment cylinder, a 500-segment cone and a unit quad. Every vertex
//! carries position, normal, tangent, binormal and texture coordinates so that
//! normal and parallax mapping work on all of them.
//!
//! Generation is pure. The renderer calls it once per [`GeometryKind`] and
//! shares the resulting buffers between every shape of that kind.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | tangent   | Float32x3 | 24     | 2               |
//! | binormal  | Float32x3 | 36     | 3               |
//! | uv        | Float32x2 | 48     | 4               |
//!
//! # Winding Order
//!
//! Front faces are wound clockwise when viewed from outside, in the left-handed
//! view space used by [`Camera`](crate::Camera).

use std::f32::consts::PI;

use glam::Vec3;

/// Number of samples around the cylinder circumference.
pub const CYLINDER_SEGMENTS: u32 = 50;
/// Number of samples around the cone base.
pub const CONE_SEGMENTS: u32 = 500;

/// The closed set of primitives the scene can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Box,
    Cylinder,
    Cone,
    Quad,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 4] = [
        GeometryKind::Box,
        GeometryKind::Cylinder,
        GeometryKind::Cone,
        GeometryKind::Quad,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GeometryKind::Box => "Box",
            GeometryKind::Cylinder => "Cylinder",
            GeometryKind::Cone => "Cone",
            GeometryKind::Quad => "Quad",
        }
    }
}

/// A vertex with a full tangent frame.
///
/// `#[repr(C)]` with [`bytemuck::Pod`] so vertex slices can be uploaded as-is.
/// Each vertex is 56 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub binormal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Vertex buffer layout for slot 0.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // tangent
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            },
            // binormal
            wgpu::VertexAttribute {
                offset: 36,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 48,
                shader_location: 4,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(
        position: [f32; 3],
        normal: [f32; 3],
        tangent: [f32; 3],
        binormal: [f32; 3],
        uv: [f32; 2],
    ) -> Self {
        Self {
            position,
            normal,
            tangent,
            binormal,
            uv,
        }
    }
}

/// CPU-side vertex and index data for one primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Generates vertex and index data for `kind`.
pub fn generate(kind: GeometryKind) -> MeshData {
    match kind {
        GeometryKind::Box => cube(),
        GeometryKind::Cylinder => cylinder(CYLINDER_SEGMENTS),
        GeometryKind::Cone => cone(CONE_SEGMENTS),
        GeometryKind::Quad => quad(),
    }
}

fn cube() -> MeshData {
    // (normal, tangent, binormal, four corners with uvs)
    type Face = ([f32; 3], [f32; 3], [f32; 3], [([f32; 3], [f32; 2]); 4]);
    const FACES: [Face; 6] = [
        // top
        (
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [
                ([0.5, 0.5, -0.5], [0.0, 0.0]),
                ([-0.5, 0.5, -0.5], [0.0, 1.0]),
                ([-0.5, 0.5, 0.5], [1.0, 1.0]),
                ([0.5, 0.5, 0.5], [1.0, 0.0]),
            ],
        ),
        // back
        (
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [
                ([0.5, -0.5, 0.5], [0.0, 0.0]),
                ([0.5, 0.5, 0.5], [0.0, 1.0]),
                ([-0.5, 0.5, 0.5], [1.0, 1.0]),
                ([-0.5, -0.5, 0.5], [1.0, 0.0]),
            ],
        ),
        // right
        (
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [
                ([0.5, -0.5, -0.5], [0.0, 0.0]),
                ([0.5, 0.5, -0.5], [0.0, 1.0]),
                ([0.5, 0.5, 0.5], [1.0, 1.0]),
                ([0.5, -0.5, 0.5], [1.0, 0.0]),
            ],
        ),
        // front
        (
            [0.0, 0.0, -1.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 0.0],
            [
                ([-0.5, -0.5, -0.5], [0.0, 0.0]),
                ([-0.5, 0.5, -0.5], [0.0, 1.0]),
                ([0.5, 0.5, -0.5], [1.0, 1.0]),
                ([0.5, -0.5, -0.5], [1.0, 0.0]),
            ],
        ),
        // left
        (
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, -1.0],
            [
                ([-0.5, -0.5, 0.5], [0.0, 0.0]),
                ([-0.5, 0.5, 0.5], [0.0, 1.0]),
                ([-0.5, 0.5, -0.5], [1.0, 1.0]),
                ([-0.5, -0.5, -0.5], [1.0, 0.0]),
            ],
        ),
        // bottom
        (
            [0.0, -1.0, 0.0],
            [0.0, 0.0, -1.0],
            [1.0, 0.0, 0.0],
            [
                ([-0.5, -0.5, -0.5], [0.0, 0.0]),
                ([0.5, -0.5, -0.5], [0.0, 1.0]),
                ([0.5, -0.5, 0.5], [1.0, 1.0]),
                ([-0.5, -0.5, 0.5], [1.0, 0.0]),
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, tangent, binormal, corners) in FACES {
        let base = vertices.len() as u32;
        for (position, uv) in corners {
            vertices.push(Vertex::new(position, normal, tangent, binormal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// Fraction around the circle and the matching angle for sample `i`.
///
/// The last sample lands back on the first so texture seams close.
fn ring_sample(i: u32, segments: u32) -> (f32, f32) {
    let fraction = i as f32 / (segments - 1) as f32;
    (fraction, 2.0 * PI * fraction)
}

fn cylinder(segments: u32) -> MeshData {
    let up = [0.0, 1.0, 0.0];
    let down = [0.0, -1.0, 0.0];
    let plus_x = [1.0, 0.0, 0.0];
    let plus_z = [0.0, 0.0, 1.0];
    let minus_x = [-1.0, 0.0, 0.0];
    let minus_z = [0.0, 0.0, -1.0];
    let (top, bottom) = ([0.0, 0.5, 0.0], [0.0, -0.5, 0.0]);

    let mut vertices = Vec::with_capacity(2 + segments as usize * 4);
    // cap centres
    vertices.push(Vertex::new(top, up, plus_x, plus_z, [0.5, 0.5]));
    vertices.push(Vertex::new(bottom, down, plus_x, plus_z, [0.5, 0.5]));

    for i in 0..segments {
        let (fraction, theta) = ring_sample(i, segments);
        let (s, c) = theta.sin_cos();
        let normal = Vec3::new(s, 0.0, c);
        let tangent = Vec3::Y;
        let binormal = normal.cross(tangent).to_array();
        let (n, t) = (normal.to_array(), tangent.to_array());
        let cap_uv = [(s + 1.0) / 2.0, (c + 1.0) / 2.0];

        // tube
        vertices.push(Vertex::new([s, 0.5, c], n, t, binormal, [fraction, 1.0]));
        vertices.push(Vertex::new([s, -0.5, c], n, t, binormal, [fraction, 0.0]));
        // caps
        vertices.push(Vertex::new([s, 0.5, c], up, plus_x, plus_z, cap_uv));
        vertices.push(Vertex::new([s, -0.5, c], down, minus_x, minus_z, cap_uv));
    }

    // Sample k occupies vertices 2 + 4k .. 6 + 4k; each step stitches sample k - 1 to k.
    let mut indices = Vec::with_capacity((segments as usize - 1) * 12);
    for i in (4..segments * 4).step_by(4) {
        indices.extend_from_slice(&[i - 1, i + 3, i - 2]);
        indices.extend_from_slice(&[i - 2, i + 3, i + 2]);
        indices.extend_from_slice(&[0, i, i + 4]);
        indices.extend_from_slice(&[1, i + 5, i + 1]);
    }

    MeshData { vertices, indices }
}

fn cone(segments: u32) -> MeshData {
    let down = [0.0, -1.0, 0.0];
    let minus_x = [-1.0, 0.0, 0.0];
    let minus_z = [0.0, 0.0, -1.0];
    let (apex, base_centre) = ([0.0, 0.5, 0.0], [0.0, -0.5, 0.0]);
    // slope normal for unit height over unit radius
    let slope = 1.0 / 2.0_f32.sqrt();

    let mut vertices = Vec::with_capacity(segments as usize * 3 + 1);
    for i in 0..segments {
        let (fraction, theta) = ring_sample(i, segments);
        let (s, c) = theta.sin_cos();
        let normal = Vec3::new(s * -slope, -slope, c * -slope);
        let tangent = Vec3::new(s, -1.0, c);
        let binormal = normal.cross(tangent).to_array();
        let (n, t) = (normal.to_array(), tangent.to_array());
        let cap_uv = [(s + 1.0) / 2.0, (c + 1.0) / 2.0];

        // apex
        vertices.push(Vertex::new(apex, n, t, binormal, [fraction, 1.0]));
        // slope base
        vertices.push(Vertex::new([s, -0.5, c], n, t, binormal, [fraction, 0.0]));
        // base cap
        vertices.push(Vertex::new([s, -0.5, c], down, minus_x, minus_z, cap_uv));
    }
    let centre = vertices.len() as u32;
    vertices.push(Vertex::new(base_centre, down, minus_x, minus_z, [0.5, 0.5]));

    let mut indices = Vec::with_capacity((segments as usize - 1) * 6);
    for i in (0..segments * 3 - 3).step_by(3) {
        indices.extend_from_slice(&[i, i + 1, i + 4]);
        indices.extend_from_slice(&[centre, i + 5, i + 2]);
    }

    MeshData { vertices, indices }
}

fn quad() -> MeshData {
    let normal = [0.0, 0.0, -1.0];
    let tangent = [1.0, 0.0, 0.0];
    let binormal = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex::new([-0.5, -0.5, 0.0], normal, tangent, binormal, [0.0, 0.0]),
        Vertex::new([0.5, -0.5, 0.0], normal, tangent, binormal, [1.0, 0.0]),
        Vertex::new([0.5, 0.5, 0.0], normal, tangent, binormal, [1.0, 1.0]),
        Vertex::new([-0.5, 0.5, 0.0], normal, tangent, binormal, [0.0, 1.0]),
    ];
    let indices = vec![0, 2, 1, 0, 3, 2];
    MeshData { vertices, indices }
}
