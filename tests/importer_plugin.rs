//! End-to-end importer library loading. These tests need the compiled
//! `glb_importer` cdylib next to the host binaries; when it has not been
//! built yet they skip instead of failing.

use backdrop::importer::ImporterHost;
use std::env;
use std::path::PathBuf;

fn importer_artifact() -> Option<PathBuf> {
    let name = format!("{}glb_importer{}", env::consts::DLL_PREFIX, env::consts::DLL_SUFFIX);
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    for profile in ["debug", "release"] {
        let candidate = root.join("target").join(profile).join(&name);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

#[test]
fn importer_library_loads_and_reads_a_gltf_file() {
    let Some(library) = importer_artifact() else {
        eprintln!("importer library not built; skipping");
        return;
    };

    let host = ImporterHost::ensure(std::slice::from_ref(&library)).expect("importer loads");
    assert_eq!(host.importer().name(), "gltf");
    assert_eq!(host.path(), library);

    let model = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/models/demo_triangle.gltf");
    let mesh = host.importer().import(&model).expect("triangle imports");
    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert!((mesh.bounds.size().x - 2.0).abs() < 1e-6);
}

#[test]
fn ensure_is_memoized_across_callers() {
    let Some(library) = importer_artifact() else {
        eprintln!("importer library not built; skipping");
        return;
    };

    let first = ImporterHost::ensure(std::slice::from_ref(&library)).expect("importer loads");
    // The second call may pass any candidate list; the cached host wins.
    let second = ImporterHost::ensure(&[PathBuf::from("ignored.so")]).expect("cached host");
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert!(ImporterHost::ready());
}

#[test]
fn bad_candidates_fail_without_poisoning_later_loads() {
    // Uses the non-memoized path so test order cannot leak a cached host in.
    let err = ImporterHost::load_first(&[PathBuf::from("nope.so")]).expect_err("missing library");
    assert!(err.to_string().contains("nope.so"));
}
