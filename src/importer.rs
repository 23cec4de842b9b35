use crate::error::LoadFailure;
use crate::loader::LoadOnce;
use crate::model::MeshData;
use anyhow::Result;
use libloading::Library;
use std::mem;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Arc;

pub const IMPORTER_API_VERSION: u32 = 1;
pub const IMPORTER_ENTRY_SYMBOL: &[u8] = b"backdrop_importer_entry\0";
const IMPORTER_ENTRY_NAME: &str = "backdrop_importer_entry";

/// Converts an on-disk model file into mesh data. Implemented by importer
/// libraries loaded at runtime.
pub trait MeshImporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn import(&self, path: &Path) -> Result<MeshData>;
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct ImporterHandle {
    data: *mut (),
    vtable: *mut (),
}

impl ImporterHandle {
    pub const fn null() -> Self {
        Self { data: ptr::null_mut(), vtable: ptr::null_mut() }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null() || self.vtable.is_null()
    }

    /// # Safety
    /// The box must originate from the same compiler session as the host;
    /// the fat pointer layout is not a stable ABI.
    pub unsafe fn from_box(importer: Box<dyn MeshImporter>) -> Self {
        Self::from_raw(Box::into_raw(importer))
    }

    /// # Safety
    /// `raw` must be a valid `*mut dyn MeshImporter` fat pointer.
    pub unsafe fn from_raw(raw: *mut dyn MeshImporter) -> Self {
        let erased: (*mut (), *mut ()) = mem::transmute(raw);
        Self { data: erased.0, vtable: erased.1 }
    }

    /// # Safety
    /// The handle must have been produced by `from_box`/`from_raw`.
    pub unsafe fn into_raw(self) -> *mut dyn MeshImporter {
        mem::transmute((self.data, self.vtable))
    }

    /// # Safety
    /// The handle must own its importer and be consumed exactly once.
    pub unsafe fn into_box(self) -> Box<dyn MeshImporter> {
        Box::from_raw(self.into_raw())
    }
}

pub type ImporterEntryFn = unsafe extern "C" fn() -> ImporterExport;
pub type ImporterCreateFn = unsafe extern "C" fn() -> ImporterHandle;

#[repr(C)]
pub struct ImporterExport {
    pub api_version: u32,
    pub create: ImporterCreateFn,
}

static IMPORTER: LoadOnce<ImporterHost> = LoadOnce::new();

/// A loaded importer library. The library handle must outlive the importer
/// box, so the box is declared (and dropped) first.
pub struct ImporterHost {
    importer: Box<dyn MeshImporter>,
    _library: Library,
    path: PathBuf,
}

impl std::fmt::Debug for ImporterHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterHost")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ImporterHost {
    /// Process-wide memoized load. The first successful load is shared by
    /// every later caller regardless of its candidate list; a failed load is
    /// retried on the next call.
    pub fn ensure(candidates: &[PathBuf]) -> Result<Arc<Self>, LoadFailure> {
        IMPORTER.get_or_try(|| Self::load_first(candidates))
    }

    /// Whether an importer library has already been loaded.
    pub fn ready() -> bool {
        IMPORTER.is_ready()
    }

    /// Non-memoized variant: walks the candidates in order and keeps the
    /// first library that loads cleanly.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self, LoadFailure> {
        let mut tried = Vec::new();
        for path in candidates {
            match Self::load(path) {
                Ok(host) => {
                    log::info!(
                        "importer '{}' loaded from '{}'",
                        host.importer.name(),
                        path.display()
                    );
                    return Ok(host);
                }
                Err(err) => {
                    log::warn!("importer candidate '{}' rejected: {err}", path.display());
                    tried.push(path.clone());
                }
            }
        }
        Err(LoadFailure::LibraryUnavailable { tried })
    }

    fn load(path: &Path) -> Result<Self, LoadFailure> {
        let library = unsafe { Library::new(path) }.map_err(|err| LoadFailure::LibraryOpen {
            library: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let entry = unsafe { library.get::<ImporterEntryFn>(IMPORTER_ENTRY_SYMBOL) }.map_err(|_| {
            LoadFailure::EntrySymbolMissing { symbol: IMPORTER_ENTRY_NAME, library: path.to_path_buf() }
        })?;
        let export = unsafe { entry() };
        drop(entry);

        if export.api_version != IMPORTER_API_VERSION {
            return Err(LoadFailure::ApiVersionMismatch {
                expected: IMPORTER_API_VERSION,
                found: export.api_version,
            });
        }
        let handle = unsafe { (export.create)() };
        if handle.is_null() {
            return Err(LoadFailure::NullHandle { library: path.to_path_buf() });
        }
        let importer = unsafe { handle.into_box() };
        Ok(Self { importer, _library: library, path: path.to_path_buf() })
    }

    pub fn importer(&self) -> &dyn MeshImporter {
        self.importer.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_library_reports_every_candidate() {
        let candidates =
            vec![PathBuf::from("does/not/exist.so"), PathBuf::from("also/missing.so")];
        let err = ImporterHost::load_first(&candidates).expect_err("no library present");
        match err {
            LoadFailure::LibraryUnavailable { tried } => assert_eq!(tried, candidates),
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn handle_round_trips_a_boxed_importer() {
        struct Probe;
        impl MeshImporter for Probe {
            fn name(&self) -> &'static str {
                "probe"
            }
            fn import(&self, _path: &Path) -> Result<MeshData> {
                anyhow::bail!("probe importer never loads")
            }
        }

        let handle = unsafe { ImporterHandle::from_box(Box::new(Probe)) };
        assert!(!handle.is_null());
        let importer = unsafe { handle.into_box() };
        assert_eq!(importer.name(), "probe");
        assert!(ImporterHandle::null().is_null());
    }
}
