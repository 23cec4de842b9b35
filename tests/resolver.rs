//! Asset resolution: candidate fallback order, normalization of loaded
//! models, and the placeholder degrade path. Uses an in-process importer
//! that only accepts files that actually exist.

use anyhow::{bail, Result};
use backdrop::importer::MeshImporter;
use backdrop::model::{MeshData, MeshVertex};
use backdrop::visual::{resolve_visual, VisualSource};
use glam::Vec3;
use std::fs;
use std::path::{Path, PathBuf};

/// Hands back a fixed lopsided box for any path that exists on disk.
struct FileBackedImporter;

impl MeshImporter for FileBackedImporter {
    fn name(&self) -> &'static str {
        "file-backed"
    }

    fn import(&self, path: &Path) -> Result<MeshData> {
        if !path.exists() {
            bail!("no such file: {}", path.display());
        }
        // An axis-aligned box spanning (0,0,0)..(1,2,4), off-center on purpose.
        let corners = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(1.0, 0.0, 4.0),
            Vec3::new(0.0, 2.0, 4.0),
            Vec3::new(1.0, 2.0, 4.0),
        ];
        let vertices = corners.iter().map(|&p| MeshVertex::new(p, Vec3::Y)).collect();
        let indices = vec![0, 1, 2, 2, 1, 3];
        Ok(MeshData::new(vertices, indices))
    }
}

#[test]
fn first_existing_candidate_wins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let present = dir.path().join("usb.glb");
    fs::write(&present, b"stub").expect("write model stub");
    let missing = dir.path().join("asetts/usb.glb");

    let importer: &dyn MeshImporter = &FileBackedImporter;
    let candidates = vec![missing, present.clone()];
    let visual = resolve_visual(Some(importer), &candidates, 2.8);
    assert_eq!(visual.source, VisualSource::Model(present));
    assert!(visual.wireframe.is_none(), "loaded models carry no wireframe overlay");
}

#[test]
fn loaded_model_is_normalized_to_the_target_size() {
    let dir = tempfile::tempdir().expect("tempdir");
    let present = dir.path().join("usb.glb");
    fs::write(&present, b"stub").expect("write model stub");

    let importer: &dyn MeshImporter = &FileBackedImporter;
    let visual = resolve_visual(Some(importer), &[present], 2.8);

    // Largest dimension of the box is 4, so the fit scale must be 0.7.
    assert!((visual.fit.scale - 0.7).abs() < 1e-6);

    // After scale + offset the bounding-box center lands at the origin.
    let center = visual.mesh.bounds.center * visual.fit.scale + visual.fit.offset;
    assert!(center.length() < 1e-6);

    let scaled_size = visual.mesh.bounds.size() * visual.fit.scale;
    assert!((scaled_size.max_element() - 2.8).abs() < 1e-5);
}

#[test]
fn exhausted_candidates_fall_back_to_the_placeholder() {
    let importer: &dyn MeshImporter = &FileBackedImporter;
    let candidates =
        vec![PathBuf::from("asetts/usb.glb"), PathBuf::from("definitely/missing.glb")];
    let visual = resolve_visual(Some(importer), &candidates, 2.8);
    assert_eq!(visual.source, VisualSource::Placeholder);
    assert!(visual.wireframe.is_some());
}

#[test]
fn missing_importer_falls_back_to_the_placeholder() {
    let visual = resolve_visual(None, &[PathBuf::from("assets/usb.glb")], 2.8);
    assert_eq!(visual.source, VisualSource::Placeholder);
    assert_eq!(visual.fit.scale, 1.0);
}
