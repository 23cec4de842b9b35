use glam::Vec3;
use std::collections::HashSet;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position: position.to_array(), normal: normal.to_array() }
    }

    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
}

impl LineVertex {
    pub fn layout<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
}

impl MeshBounds {
    pub fn from_vertices(vertices: &[MeshVertex]) -> Self {
        if vertices.is_empty() {
            return Self { min: Vec3::ZERO, max: Vec3::ZERO, center: Vec3::ZERO };
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for vertex in vertices {
            let pos = Vec3::from_array(vertex.position);
            min = min.min(pos);
            max = max.max(pos);
        }
        Self { min, max, center: (min + max) * 0.5 }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[derive(Clone, Debug)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bounds: MeshBounds,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        let bounds = MeshBounds::from_vertices(&vertices);
        Self { vertices, indices, bounds }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Uniform scale plus post-scale translation that normalizes an object so
/// its largest bounding-box dimension equals `target` and its bounding-box
/// center sits at the origin. Deterministic for a given set of bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitTransform {
    pub scale: f32,
    pub offset: Vec3,
}

impl FitTransform {
    pub const IDENTITY: Self = Self { scale: 1.0, offset: Vec3::ZERO };

    pub fn fit_to_size(bounds: &MeshBounds, target: f32) -> Self {
        let mut max_dim = bounds.size().max_element();
        if !(max_dim > 0.0) {
            max_dim = 1.0;
        }
        let scale = target / max_dim;
        Self { scale, offset: -(bounds.center * scale) }
    }
}

/// Flat-shaded icosahedral sphere. Each subdivision level splits every face
/// into four; vertices are duplicated per face so every triangle carries its
/// own face normal.
pub fn icosahedron(radius: f32, subdivisions: u32) -> MeshData {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let corners: [Vec3; 12] = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(|v| v.normalize());
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    let mut triangles: Vec<[Vec3; 3]> =
        faces.iter().map(|&[a, b, c]| [corners[a], corners[b], corners[c]]).collect();
    for _ in 0..subdivisions {
        let mut next = Vec::with_capacity(triangles.len() * 4);
        for [a, b, c] in triangles {
            let ab = a.midpoint(b).normalize();
            let bc = b.midpoint(c).normalize();
            let ca = c.midpoint(a).normalize();
            next.push([a, ab, ca]);
            next.push([ab, b, bc]);
            next.push([ca, bc, c]);
            next.push([ab, bc, ca]);
        }
        triangles = next;
    }

    let mut vertices = Vec::with_capacity(triangles.len() * 3);
    let mut indices = Vec::with_capacity(triangles.len() * 3);
    for [a, b, c] in &triangles {
        let (a, b, c) = (*a * radius, *b * radius, *c * radius);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let base = vertices.len() as u32;
        vertices.push(MeshVertex::new(a, normal));
        vertices.push(MeshVertex::new(b, normal));
        vertices.push(MeshVertex::new(c, normal));
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    MeshData::new(vertices, indices)
}

/// Unique-edge line list for a wireframe overlay. Edges shared between
/// triangles are keyed by quantized endpoint positions so duplicated
/// flat-shading vertices still collapse to one line segment.
pub fn edge_lines(mesh: &MeshData) -> Vec<LineVertex> {
    let mut seen: HashSet<([i32; 3], [i32; 3])> = HashSet::new();
    let mut lines = Vec::new();
    for tri in mesh.indices.chunks(3) {
        if tri.len() < 3 {
            continue;
        }
        for (i, j) in [(0, 1), (1, 2), (2, 0)] {
            let a = mesh.vertices[tri[i] as usize].position;
            let b = mesh.vertices[tri[j] as usize].position;
            let (ka, kb) = (quantize(a), quantize(b));
            let key = if ka <= kb { (ka, kb) } else { (kb, ka) };
            if seen.insert(key) {
                lines.push(LineVertex { position: a });
                lines.push(LineVertex { position: b });
            }
        }
    }
    lines
}

fn quantize(position: [f32; 3]) -> [i32; 3] {
    position.map(|v| (v * 1024.0).round() as i32)
}
