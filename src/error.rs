use std::path::PathBuf;
use thiserror::Error;

/// Failures while acquiring the shared runtimes a backdrop session needs.
/// None of these are cached; a later start attempt retries from scratch.
#[derive(Debug, Error)]
pub enum LoadFailure {
    #[error("no compatible graphics adapter is available")]
    Unsupported,

    #[error("graphics device request failed: {0}")]
    Device(String),

    #[error("importer library '{library}' could not be opened: {reason}")]
    LibraryOpen { library: PathBuf, reason: String },

    #[error("no importer library could be loaded (tried {tried:?})")]
    LibraryUnavailable { tried: Vec<PathBuf> },

    #[error("importer library '{library}' does not export '{symbol}'")]
    EntrySymbolMissing { symbol: &'static str, library: PathBuf },

    #[error("importer api version mismatch: host expects {expected}, library reports {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    #[error("importer library '{library}' returned a null importer")]
    NullHandle { library: PathBuf },
}
