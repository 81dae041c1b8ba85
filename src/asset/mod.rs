pub mod cache;
pub mod handle;
pub mod model;

pub use cache::AssetCache;
pub use handle::Handle;
pub use model::{BoundingSphere, DrawRange, Lod, Model, Submesh, VertexLayout};

use crate::renderer::material::MaterialLibrary;

/// Models and materials the frame pipeline reads from.
pub struct Assets {
    pub models: AssetCache<Model>,
    pub materials: MaterialLibrary,
}

impl Assets {
    pub fn new(materials: MaterialLibrary) -> Self {
        Self {
            models: AssetCache::new(),
            materials,
        }
    }
}

impl Default for Assets {
    fn default() -> Self {
        Self::new(MaterialLibrary::default())
    }
}
