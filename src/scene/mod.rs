// scene/mod.rs

pub mod bones;
pub mod camera;
pub mod frustum;
pub(crate) mod internal;
pub mod lod;
pub mod registry;
pub mod render_object;
pub mod render_scene;
pub mod static_cache;

// Re-export commonly used types
pub use bones::BoneBuffer;
pub use camera::{Camera, FrameView, ViewMode};
pub use frustum::{cull_spheres, Frustum};
pub use registry::{Registry, RegistryError, RegistryHandle};
pub use render_object::{LightKind, ObjectFlags, RenderDecal, RenderLight, RenderObject};
pub use render_scene::{FrameLists, FrameStats, RenderScene};
pub use static_cache::StaticCache;

pub type ObjectHandle = RegistryHandle<RenderObject>;
pub type LightHandle = RegistryHandle<RenderLight>;
pub type DecalHandle = RegistryHandle<RenderDecal>;
