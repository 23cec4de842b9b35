use crate::importer::MeshImporter;
use crate::model::{edge_lines, icosahedron, FitTransform, LineVertex, MeshData};
use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};

pub const PLACEHOLDER_RADIUS: f32 = 1.6;
pub const PLACEHOLDER_SUBDIVISIONS: u32 = 2;

pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub base_color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialParams {
    /// Dark, mostly-metallic look for the procedural placeholder.
    pub fn placeholder() -> Self {
        Self { base_color: rgb(0x101316), roughness: 0.25, metalness: 0.75 }
    }

    /// Neutral surface for loaded models; asset materials are out of scope.
    pub fn model() -> Self {
        Self { base_color: rgb(0xc8ccd2), roughness: 0.6, metalness: 0.1 }
    }
}

/// Thin translucent line overlay parented to the mesh.
#[derive(Clone, Debug)]
pub struct WireframeOverlay {
    pub lines: Vec<LineVertex>,
    pub color: Vec3,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisualSource {
    Model(PathBuf),
    Placeholder,
}

/// The single visible object of a backdrop session: either a normalized
/// external model or the procedural placeholder.
#[derive(Clone, Debug)]
pub struct VisualObject {
    pub mesh: MeshData,
    pub material: MaterialParams,
    pub wireframe: Option<WireframeOverlay>,
    pub fit: FitTransform,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub source: VisualSource,
}

impl VisualObject {
    fn new(mesh: MeshData, material: MaterialParams, fit: FitTransform, source: VisualSource) -> Self {
        Self { mesh, material, wireframe: None, fit, rotation_x: 0.0, rotation_y: 0.0, source }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.fit.offset)
            * Mat4::from_rotation_x(self.rotation_x)
            * Mat4::from_rotation_y(self.rotation_y)
            * Mat4::from_scale(Vec3::splat(self.fit.scale))
    }
}

/// Resolves the session visual: each candidate path is tried in order
/// through the importer, the first success wins, and exhaustion (or a
/// missing importer) falls back to the placeholder. Never fails.
pub fn resolve_visual(
    importer: Option<&dyn MeshImporter>,
    candidates: &[PathBuf],
    target_size: f32,
) -> VisualObject {
    if let Some(importer) = importer {
        for path in candidates {
            match importer.import(path) {
                Ok(mesh) => return from_model(mesh, path, target_size),
                Err(err) => {
                    log::warn!("model candidate '{}' skipped: {err:#}", path.display());
                }
            }
        }
        log::info!("all {} model candidates failed; using placeholder", candidates.len());
    } else {
        log::info!("no model importer available; using placeholder");
    }
    placeholder()
}

fn from_model(mesh: MeshData, path: &Path, target_size: f32) -> VisualObject {
    let fit = FitTransform::fit_to_size(&mesh.bounds, target_size);
    log::info!(
        "loaded model '{}' ({} triangles, scale {:.3})",
        path.display(),
        mesh.triangle_count(),
        fit.scale
    );
    VisualObject::new(mesh, MaterialParams::model(), fit, VisualSource::Model(path.to_path_buf()))
}

/// Procedurally generated fallback. Performs no I/O.
pub fn placeholder() -> VisualObject {
    let mesh = icosahedron(PLACEHOLDER_RADIUS, PLACEHOLDER_SUBDIVISIONS);
    let lines = edge_lines(&mesh);
    let mut visual = VisualObject::new(
        mesh,
        MaterialParams::placeholder(),
        FitTransform::IDENTITY,
        VisualSource::Placeholder,
    );
    visual.wireframe = Some(WireframeOverlay { lines, color: rgb(0x3ddcf4), opacity: 0.15 });
    visual
}
