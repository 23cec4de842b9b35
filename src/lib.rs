pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod importer;
pub mod loader;
pub mod logging;
pub mod model;
pub mod page;
pub mod renderer;
pub mod runtime;
pub mod scene;
pub mod session;
pub mod visual;

pub use app::run;
pub use controller::{LifecycleController, SessionState};
pub use error::LoadFailure;
