use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: "Advisor".to_string(), width: 1280, height: 720, vsync: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetConfig {
    /// Candidate model paths, tried in order. These are independent
    /// configured locations; no path is derived from another.
    #[serde(default = "AssetConfig::default_candidates")]
    pub candidates: Vec<PathBuf>,
    /// Largest bounding-box dimension a loaded model is scaled to.
    #[serde(default = "AssetConfig::default_target_size")]
    pub target_size: f32,
}

impl AssetConfig {
    fn default_candidates() -> Vec<PathBuf> {
        vec![PathBuf::from("asetts/usb.glb"), PathBuf::from("assets/usb.glb")]
    }

    const fn default_target_size() -> f32 {
        2.8
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self { candidates: Self::default_candidates(), target_size: Self::default_target_size() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImporterConfig {
    /// Candidate importer library paths, tried in order.
    #[serde(default = "ImporterConfig::default_libraries")]
    pub libraries: Vec<PathBuf>,
}

impl ImporterConfig {
    fn default_libraries() -> Vec<PathBuf> {
        let name = format!("{}glb_importer{}", env::consts::DLL_PREFIX, env::consts::DLL_SUFFIX);
        vec![PathBuf::from("plugins").join(&name), PathBuf::from(name)]
    }
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self { libraries: Self::default_libraries() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BackdropConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub asset: AssetConfig,
    #[serde(default)]
    pub importer: ImporterConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub vsync: Option<bool>,
}

impl BackdropConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("config load error: {err:#}; falling back to defaults");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(vsync) = overrides.vsync {
            self.window.vsync = vsync;
        }
    }
}
