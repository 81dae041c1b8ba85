use crate::asset::{AssetCache, Model};
use crate::renderer::material::{Material, MaterialQuery, ShaderFlags};
use crate::renderer::pass::{PassObject, PassSet, RenderPass};
use crate::renderer::sort_key::{DrawLayer, SortKey};
use crate::scene::camera::ViewMode;
use crate::scene::render_object::{ObjectFlags, RenderObject};
use crate::scene::ObjectHandle;

/// Loaded model of a proxy, if it has one.
pub(crate) fn drawable_model<'a>(
    object: &RenderObject,
    models: &'a AssetCache<Model>,
) -> Option<&'a Model> {
    object
        .model
        .and_then(|handle| models.get(handle))
        .filter(|model| model.loaded)
}

pub(crate) fn shader_flags(
    pass: RenderPass,
    object: &RenderObject,
    model: &Model,
    mode: ViewMode,
) -> ShaderFlags {
    let mut flags = ShaderFlags::empty();
    if model.skinned {
        flags |= ShaderFlags::ANIMATED;
    }

    match pass {
        RenderPass::Shadow | RenderPass::DepthPrepass => flags |= ShaderFlags::DEPTH_ONLY,
        RenderPass::Transparent => flags |= ShaderFlags::FORCED_FORWARD,
        RenderPass::EditorSelection => flags |= ShaderFlags::EDITOR_ID,
        RenderPass::Opaque => {
            if model.has_lightmap_coords && object.flags.contains(ObjectFlags::LIGHTMAPPED) {
                flags |= ShaderFlags::LIGHTMAPPED;
            }
            if mode.editor {
                flags |= ShaderFlags::EDITOR_ID;
            }
            if object.flags.contains(ObjectFlags::NO_TAA) {
                flags |= ShaderFlags::NO_TAA;
            }
            if mode.debug {
                flags |= ShaderFlags::DEBUG;
            }
        }
    }
    flags
}

/// An object that passed the candidate checks, at one LOD.
pub(crate) struct Candidate<'a> {
    pub handle: ObjectHandle,
    pub slot: u32,
    pub object: &'a RenderObject,
    pub model: &'a Model,
    pub lod: usize,
    pub in_view: bool,
    pub casts_shadow: bool,
    pub distance: u16,
}

pub(crate) struct Classifier<'a> {
    pub materials: &'a dyn MaterialQuery,
    pub mode: ViewMode,
    pub depth_prepass_all: bool,
}

impl Classifier<'_> {
    /// Routes every submesh of the candidate's LOD to its passes. Returns the
    /// number of pass objects added.
    pub(crate) fn classify(&self, candidate: &Candidate<'_>, out: &mut PassSet) -> usize {
        if !candidate.in_view && !candidate.casts_shadow {
            return 0;
        }

        let object = candidate.object;
        let model = candidate.model;
        let prepass = object.flags.contains(ObjectFlags::SORT_FIRST) || self.depth_prepass_all;
        let outlined = self.mode.editor && object.flags.contains(ObjectFlags::OUTLINE);
        let mut added = 0;

        for submesh in model.lod_submeshes(candidate.lod) {
            let requested = object
                .material_override
                .or_else(|| model.default_material(submesh));
            let Some((handle, material)) = self.materials.resolve(requested) else {
                continue;
            };
            let Some(draw) = model.draw_range(submesh) else {
                continue;
            };

            let mut push = |pass: RenderPass| {
                let distance = if pass.requires_back_to_front_sort() {
                    candidate.distance
                } else {
                    0
                };
                out.get_mut(pass).objects.push(PassObject {
                    object: candidate.handle,
                    slot: candidate.slot,
                    submesh: submesh as u32,
                    lod: candidate.lod as u8,
                    material: handle,
                    material_gpu_index: material.gpu_index.unwrap_or(0),
                    alpha_tested: material.alpha_tested,
                    draw,
                    sort_key: self.sort_key(pass, object, model, material, distance),
                    batch: 0,
                });
                added += 1;
            };

            if material.forward {
                if candidate.in_view {
                    push(RenderPass::Transparent);
                }
                if candidate.casts_shadow && !material.translucent {
                    push(RenderPass::Shadow);
                }
            } else {
                if candidate.in_view {
                    push(RenderPass::Opaque);
                    if prepass {
                        push(RenderPass::DepthPrepass);
                    }
                }
                if candidate.casts_shadow {
                    push(RenderPass::Shadow);
                }
            }

            if candidate.in_view && outlined {
                push(RenderPass::EditorSelection);
            }
        }

        added
    }

    fn sort_key(
        &self,
        pass: RenderPass,
        object: &RenderObject,
        model: &Model,
        material: &Material,
        distance: u16,
    ) -> SortKey {
        let flags = shader_flags(pass, object, model, self.mode);
        SortKey {
            layer: if object.is_skybox() {
                DrawLayer::Skybox
            } else {
                DrawLayer::World
            },
            shader: self.materials.shader_index(model, material, flags),
            blend: material.blend,
            backface_culling: material.backface_culling,
            texture_set: material.texture_set,
            vertex_layout: model.vertex_layout,
            mesh: model.uid,
            distance,
        }
    }
}
