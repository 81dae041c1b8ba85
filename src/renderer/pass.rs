use crate::asset::{DrawRange, Handle};
use crate::renderer::material::Material;
use crate::renderer::sort_key::SortKey;
use crate::scene::ObjectHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPass {
    Opaque,          // Deferred gbuffer geometry
    Transparent,     // Forward materials, sorted by distance
    Shadow,          // Depth-only, shared by every shadow view
    DepthPrepass,    // Depth-only, drawn before the gbuffer
    EditorSelection, // Outlined objects in the editor
}

impl RenderPass {
    pub const ALL: [RenderPass; 5] = [
        RenderPass::Opaque,
        RenderPass::Transparent,
        RenderPass::Shadow,
        RenderPass::DepthPrepass,
        RenderPass::EditorSelection,
    ];

    /// Instances in this pass are ordered by distance and never merged into
    /// instanced draws.
    pub fn requires_back_to_front_sort(self) -> bool {
        matches!(self, Self::Transparent)
    }

    /// Depth-only passes can ignore textures on materials without alpha test.
    pub fn is_depth_only(self) -> bool {
        matches!(self, Self::Shadow | Self::DepthPrepass)
    }
}

/// One submesh of one object, queued for a pass.
#[derive(Debug, Clone, Copy)]
pub struct PassObject {
    pub object: ObjectHandle,
    /// Dense registry slot, refreshed every frame.
    pub slot: u32,
    pub submesh: u32,
    pub lod: u8,
    pub material: Handle<Material>,
    pub material_gpu_index: u32,
    pub alpha_tested: bool,
    pub draw: DrawRange,
    pub sort_key: SortKey,
    /// Mesh batch this object landed in after `make_batches`.
    pub batch: u32,
}

/// A run of pass objects drawn with one instanced command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBatch {
    pub first_object: u32,
    pub object_count: u32,
    pub draw: DrawRange,
    pub material_gpu_index: u32,
}

/// A run of mesh batches submitted with one multi-draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultidrawBatch {
    pub first_mesh_batch: u32,
    pub mesh_batch_count: u32,
    /// Key of the first object, carrying the pipeline and texture state.
    pub key: SortKey,
}

pub struct PassList {
    pub pass: RenderPass,
    pub objects: Vec<PassObject>,
    pub mesh_batches: Vec<MeshBatch>,
    pub multidraw_batches: Vec<MultidrawBatch>,
}

impl PassList {
    pub fn new(pass: RenderPass) -> Self {
        Self {
            pass,
            objects: Vec::new(),
            mesh_batches: Vec::new(),
            multidraw_batches: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.mesh_batches.clear();
        self.multidraw_batches.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn batch_objects(&self, batch: &MeshBatch) -> &[PassObject] {
        let start = batch.first_object as usize;
        &self.objects[start..start + batch.object_count as usize]
    }
}

/// One list per pass kind.
pub struct PassSet {
    pub opaque: PassList,
    pub transparent: PassList,
    pub shadow: PassList,
    pub depth_prepass: PassList,
    pub editor_selection: PassList,
}

impl PassSet {
    pub fn new() -> Self {
        Self {
            opaque: PassList::new(RenderPass::Opaque),
            transparent: PassList::new(RenderPass::Transparent),
            shadow: PassList::new(RenderPass::Shadow),
            depth_prepass: PassList::new(RenderPass::DepthPrepass),
            editor_selection: PassList::new(RenderPass::EditorSelection),
        }
    }

    pub fn get(&self, pass: RenderPass) -> &PassList {
        match pass {
            RenderPass::Opaque => &self.opaque,
            RenderPass::Transparent => &self.transparent,
            RenderPass::Shadow => &self.shadow,
            RenderPass::DepthPrepass => &self.depth_prepass,
            RenderPass::EditorSelection => &self.editor_selection,
        }
    }

    pub fn get_mut(&mut self, pass: RenderPass) -> &mut PassList {
        match pass {
            RenderPass::Opaque => &mut self.opaque,
            RenderPass::Transparent => &mut self.transparent,
            RenderPass::Shadow => &mut self.shadow,
            RenderPass::DepthPrepass => &mut self.depth_prepass,
            RenderPass::EditorSelection => &mut self.editor_selection,
        }
    }

    pub fn clear(&mut self) {
        for pass in RenderPass::ALL {
            self.get_mut(pass).clear();
        }
    }

    pub fn object_count(&self) -> usize {
        RenderPass::ALL.iter().map(|&pass| self.get(pass).len()).sum()
    }
}

impl Default for PassSet {
    fn default() -> Self {
        Self::new()
    }
}
