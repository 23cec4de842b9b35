//! glTF/GLB importer library. Loaded at runtime through the importer entry
//! point; the host never links against this crate directly.

use anyhow::{bail, Context, Result};
use backdrop::importer::{
    ImporterExport, ImporterHandle, MeshImporter, IMPORTER_API_VERSION,
};
use backdrop::model::{MeshData, MeshVertex};
use glam::{Mat4, Vec3};
use std::path::Path;

struct GltfImporter;

impl MeshImporter for GltfImporter {
    fn name(&self) -> &'static str {
        "gltf"
    }

    fn import(&self, path: &Path) -> Result<MeshData> {
        let (document, buffers, _images) = gltf::import(path)
            .with_context(|| format!("Failed to import glTF file {}", path.display()))?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        let mut walked_scene = false;
        if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
            walked_scene = true;
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &buffers, &mut vertices, &mut indices);
            }
        }
        // Files with no scene graph can still carry raw meshes.
        if !walked_scene || vertices.is_empty() {
            for mesh in document.meshes() {
                collect_mesh(&mesh, Mat4::IDENTITY, &buffers, &mut vertices, &mut indices);
            }
        }

        if vertices.is_empty() || indices.is_empty() {
            bail!("glTF file {} contains no triangle geometry", path.display());
        }
        Ok(MeshData::new(vertices, indices))
    }
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    vertices: &mut Vec<MeshVertex>,
    indices: &mut Vec<u32>,
) {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, transform, buffers, vertices, indices);
    }
    for child in node.children() {
        collect_node(&child, transform, buffers, vertices, indices);
    }
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
    vertices: &mut Vec<MeshVertex>,
    indices: &mut Vec<u32>,
) {
    let normal_matrix = transform.inverse().transpose();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| &b.0[..]));
        let Some(positions) = reader.read_positions() else { continue };
        let positions: Vec<Vec3> = positions.map(Vec3::from_array).collect();
        let normals: Option<Vec<Vec3>> =
            reader.read_normals().map(|iter| iter.map(Vec3::from_array).collect());

        let base = vertices.len() as u32;
        let primitive_indices: Vec<u32> = match reader.read_indices() {
            Some(read) => read.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        // Malformed files can reference vertices past the position accessor;
        // drop the primitive rather than index out of range.
        if primitive_indices.iter().any(|&i| i as usize >= positions.len()) {
            continue;
        }

        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals,
            _ => compute_normals(&positions, &primitive_indices),
        };

        for (position, normal) in positions.iter().zip(&normals) {
            let world = transform.transform_point3(*position);
            let n = normal_matrix.transform_vector3(*normal).normalize_or_zero();
            vertices.push(MeshVertex::new(world, n));
        }
        indices.extend(primitive_indices.iter().map(|i| base + i));
    }
}

/// Area-weighted vertex normals for primitives that ship without any.
fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    for normal in &mut normals {
        *normal = normal.try_normalize().unwrap_or(Vec3::Y);
    }
    normals
}

unsafe extern "C" fn create_importer() -> ImporterHandle {
    ImporterHandle::from_box(Box::new(GltfImporter))
}

#[no_mangle]
pub extern "C" fn backdrop_importer_entry() -> ImporterExport {
    ImporterExport { api_version: IMPORTER_API_VERSION, create: create_importer }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_normals_face_outward_for_a_ccw_triangle() {
        let positions =
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        for normal in normals {
            assert!((normal - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn out_of_range_indices_are_skipped_not_indexed() {
        let positions =
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)];
        let normals = compute_normals(&positions, &[0, 1, 10]);
        assert_eq!(normals.len(), 3);
        for normal in normals {
            assert_eq!(normal, Vec3::Y, "untouched vertices keep the fallback normal");
        }
    }

    #[test]
    fn degenerate_triangles_fall_back_to_a_unit_normal() {
        let positions = vec![Vec3::ZERO, Vec3::ZERO, Vec3::ZERO];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[0], Vec3::Y);
    }
}
