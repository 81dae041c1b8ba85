//! Per-frame visibility, LOD and draw-list compilation for a multi-view
//! renderer, driven by a small counter-based job system.

pub mod asset;
pub mod jobs;
pub mod renderer;
pub mod scene;
pub mod settings;

pub use renderer::{RenderContext, RenderList};
pub use scene::{FrameView, RenderScene};
pub use settings::RenderSettings;

/// Installs the `env_logger` backend at info level. Safe to call more than
/// once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
