use crate::asset::VertexLayout;
use crate::renderer::material::{BlendMode, ShaderId};
use crate::renderer::sort_key::{DrawLayer, SortKey};

/// Fixed-function and shader state shared by one multidraw batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineState {
    pub layer: DrawLayer,
    pub shader: ShaderId,
    pub blend: BlendMode,
    pub backface_culling: bool,
    pub vertex_layout: VertexLayout,
}

impl From<&SortKey> for PipelineState {
    fn from(key: &SortKey) -> Self {
        Self {
            layer: key.layer,
            shader: key.shader,
            blend: key.blend,
            backface_culling: key.backface_culling,
            vertex_layout: key.vertex_layout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Backend-agnostic command stream produced from a compiled render list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    SetPipeline(PipelineState),
    SetTexture {
        texture_set: u32,
    },
    SetScissor(ScissorRect),
    ClearScissor,
    /// Single instanced draw. `instance` indexes the list's instance-to-slot
    /// table.
    DrawCall {
        index_count: u32,
        first_index: u32,
        base_vertex: i32,
        instance: u32,
        material: u32,
    },
    /// `command_count` indirect commands starting at `first_command`.
    MultiDrawIndirect {
        first_command: u32,
        command_count: u32,
    },
}

impl DrawCommand {
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            DrawCommand::DrawCall { .. } | DrawCommand::MultiDrawIndirect { .. }
        )
    }
}
