use crate::asset::VertexLayout;
use crate::renderer::material::{BlendMode, ShaderId};

/// Coarse draw ordering. Later layers draw after earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum DrawLayer {
    #[default]
    World,
    Skybox,
}

/// Composite draw ordering key. Field order is significance order, so the
/// derived `Ord` compares layer first and distance last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SortKey {
    pub layer: DrawLayer,
    pub shader: ShaderId,
    pub blend: BlendMode,
    pub backface_culling: bool,
    pub texture_set: u32,
    pub vertex_layout: VertexLayout,
    pub mesh: u32,
    /// Quantized camera distance. Zero outside the transparent pass.
    pub distance: u16,
}

const DISTANCE_BITS: u32 = 14;
const MESH_BITS: u32 = 14;
const VAO_BITS: u32 = 3;
const TEXTURE_BITS: u32 = 14;
const BACKFACE_BITS: u32 = 1;
const BLEND_BITS: u32 = 3;
const SHADER_BITS: u32 = 12;
const LAYER_BITS: u32 = 3;

impl SortKey {
    /// Can instances with these keys share one multi-draw-indirect call.
    pub fn same_pipeline(&self, other: &Self) -> bool {
        self.layer == other.layer
            && self.shader == other.shader
            && self.blend == other.blend
            && self.backface_culling == other.backface_culling
            && self.vertex_layout == other.vertex_layout
    }

    /// Packs the key into 64 bits for debug output and GPU-side inspection.
    /// Fields wider than their slot are truncated, so packed ordering only
    /// matches `Ord` while ids stay small.
    pub fn packed(&self) -> u64 {
        let fields = [
            ((self.distance >> (16 - DISTANCE_BITS)) as u64, DISTANCE_BITS),
            (self.mesh as u64, MESH_BITS),
            (self.vertex_layout.id() as u64, VAO_BITS),
            (self.texture_set as u64, TEXTURE_BITS),
            (self.backface_culling as u64, BACKFACE_BITS),
            (self.blend.id() as u64, BLEND_BITS),
            (self.shader.0 as u64, SHADER_BITS),
            (self.layer as u64, LAYER_BITS),
        ];

        let mut packed = 0u64;
        let mut shift = 0;
        for (value, bits) in fields {
            packed |= (value & ((1u64 << bits) - 1)) << shift;
            shift += bits;
        }
        packed
    }
}
