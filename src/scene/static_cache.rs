use log::{debug, info};

use super::camera::ViewMode;
use super::internal::classify::{drawable_model, Candidate, Classifier};
use super::lod::LodChoice;
use super::registry::Registry;
use super::render_object::{ObjectFlags, RenderObject};
use crate::asset::{AssetCache, Model};
use crate::renderer::pass::{PassSet, RenderPass};

/// Pre-classified pass entries for static objects, covering every LOD.
///
/// The cache is rebuilt as a whole whenever it is marked dirty. Each frame the
/// entries matching the frame's LOD choice and visibility are appended to the
/// live passes.
pub struct StaticCache {
    passes: PassSet,
    dirty: bool,
    rebuilds: u64,
    /// View mode and prepass setting the entries were classified under.
    inputs: Option<(ViewMode, bool)>,
}

impl StaticCache {
    pub fn new() -> Self {
        Self {
            passes: PassSet::new(),
            dirty: true,
            rebuilds: 0,
            inputs: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of full rebuilds performed so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn cached_entries(&self) -> usize {
        self.passes.object_count()
    }

    /// Marks the cache dirty if the editor or debug context, or the
    /// depth-prepass-all setting, changed.
    pub(crate) fn track_inputs(&mut self, mode: ViewMode, depth_prepass_all: bool) {
        let inputs = Some((mode, depth_prepass_all));
        if self.inputs != inputs {
            debug!(
                "Render mode {:?} (prepass all: {}), static cache invalidated",
                mode, depth_prepass_all
            );
            self.inputs = inputs;
            self.dirty = true;
        }
    }

    pub(crate) fn rebuild_if_dirty(
        &mut self,
        classifier: &Classifier<'_>,
        objects: &Registry<RenderObject>,
        models: &AssetCache<Model>,
    ) -> bool {
        if !self.dirty {
            return false;
        }

        self.passes.clear();
        let mut static_objects = 0;
        for (slot, object) in objects.values().iter().enumerate() {
            if !object.is_static() || object.is_skybox() || !object.flags.contains(ObjectFlags::VISIBLE) {
                continue;
            }
            let (Some(handle), Some(model)) = (objects.handle_at(slot), drawable_model(object, models)) else {
                continue;
            };

            static_objects += 1;
            for lod in 0..model.lods.len() {
                classifier.classify(
                    &Candidate {
                        handle,
                        slot: slot as u32,
                        object,
                        model,
                        lod,
                        in_view: true,
                        casts_shadow: object.flags.contains(ObjectFlags::SHADOW_CASTER),
                        distance: 0,
                    },
                    &mut self.passes,
                );
            }
        }

        self.dirty = false;
        self.rebuilds += 1;
        info!(
            "Rebuilt static cache: {} objects, {} entries",
            static_objects,
            self.passes.object_count()
        );
        true
    }

    /// Appends entries whose LOD matches this frame's choice. Non-shadow
    /// passes also require main-view visibility; shadow entries are filtered
    /// per shadow view when compiled.
    pub(crate) fn merge_into(
        &self,
        passes: &mut PassSet,
        objects: &Registry<RenderObject>,
        visible: &[bool],
        lods: &[LodChoice],
    ) -> usize {
        let mut merged = 0;
        for pass in RenderPass::ALL {
            let needs_view = pass != RenderPass::Shadow;
            let target = passes.get_mut(pass);

            for entry in &self.passes.get(pass).objects {
                let Ok(slot) = objects.slot_of(entry.object) else {
                    continue;
                };
                let Some(choice) = lods.get(slot) else {
                    continue;
                };
                if choice.lod != entry.lod || (needs_view && !visible[slot]) {
                    continue;
                }

                let mut entry = *entry;
                entry.slot = slot as u32;
                if pass.requires_back_to_front_sort() {
                    entry.sort_key.distance = choice.distance;
                }
                target.objects.push(entry);
                merged += 1;
            }
        }
        merged
    }
}

impl Default for StaticCache {
    fn default() -> Self {
        Self::new()
    }
}
