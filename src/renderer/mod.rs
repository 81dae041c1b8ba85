pub mod arena;
pub mod batch;
pub mod commands;
pub mod context;
pub mod draw_list;
pub mod material;
pub mod objects;
pub mod pass;
pub mod sort_key;

pub use arena::FrameArena;
pub use batch::make_batches;
pub use commands::{DrawCommand, PipelineState, ScissorRect};
pub use context::RenderContext;
pub use draw_list::{DrawElementsIndirectCommand, RenderList, UNUSED_INSTANCE};
pub use material::{BlendMode, Material, MaterialLibrary, MaterialQuery, ShaderFlags, ShaderId};
pub use objects::ObjectInstance;
pub use pass::{PassList, PassObject, PassSet, RenderPass};
pub use sort_key::{DrawLayer, SortKey};
