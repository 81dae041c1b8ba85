use std::sync::Arc;

use glam::{Mat4, Vec4};
use log::debug;

use super::bones::BoneBuffer;
use super::camera::FrameView;
use super::frustum::Frustum;
use super::internal::classify::{drawable_model, Candidate, Classifier};
use super::internal::culling::{cull_job, visibility_buffer, CullTarget, Culled};
use super::lod::{compute_lods, LodChoice};
use super::registry::{Registry, RegistryError};
use super::render_object::{LightKind, ObjectFlags, RenderDecal, RenderLight, RenderObject};
use super::static_cache::StaticCache;
use super::{DecalHandle, LightHandle, ObjectHandle};
use crate::asset::{AssetCache, Model};
use crate::jobs::Job;
use crate::renderer::batch::make_batches;
use crate::renderer::commands::{DrawCommand, ScissorRect};
use crate::renderer::context::RenderContext;
use crate::renderer::draw_list::RenderList;
use crate::renderer::material::MaterialQuery;
use crate::renderer::objects::{object_instances_job, ObjectInstance};
use crate::renderer::pass::{PassList, PassSet, RenderPass};
use crate::settings::{DrawSubmission, RenderSettings, SHADOW_CASCADES};

#[derive(Debug)]
pub struct SpotShadowList {
    pub light: LightHandle,
    pub list: RenderList,
}

/// Compiled draw lists for every view of a frame.
#[derive(Debug, Default)]
pub struct FrameLists {
    pub gbuffer: RenderList,
    pub transparent: RenderList,
    pub depth_prepass: RenderList,
    pub editor_selection: RenderList,
    pub cascades: [RenderList; SHADOW_CASCADES],
    /// Kept across frames; only rebuilt while the light is dirty.
    pub spot_shadows: Vec<SpotShadowList>,
}

impl FrameLists {
    pub fn spot_shadow(&self, light: LightHandle) -> Option<&RenderList> {
        self.spot_shadows
            .iter()
            .find(|spot| spot.light == light)
            .map(|spot| &spot.list)
    }

    /// Encodes the main view's lists in submission order.
    pub fn encode_main_view(
        &self,
        submission: DrawSubmission,
        scissor: Option<ScissorRect>,
        out: &mut Vec<DrawCommand>,
    ) {
        for list in [
            &self.depth_prepass,
            &self.gbuffer,
            &self.transparent,
            &self.editor_selection,
        ] {
            list.encode(submission, scissor, out);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub objects: usize,
    pub visible: usize,
    pub pass_objects: usize,
    pub static_merged: usize,
    pub mesh_batches: usize,
    pub multidraw_batches: usize,
    pub spot_shadows_rebuilt: usize,
    pub triangles: u64,
}

/// Renderer-side scene: proxies, lights and decals plus everything derived
/// from them each frame.
pub struct RenderScene {
    objects: Registry<RenderObject>,
    lights: Registry<RenderLight>,
    decals: Registry<RenderDecal>,
    static_cache: StaticCache,
    bones: BoneBuffer,
    passes: PassSet,
    lists: FrameLists,
    visible: Vec<bool>,
    cascade_visible: [Vec<bool>; SHADOW_CASCADES],
    lods: Vec<LodChoice>,
    instances: Vec<ObjectInstance>,
    visible_decals: Vec<DecalHandle>,
    shadow_scene_changed: bool,
    stats: FrameStats,
}

impl RenderScene {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            objects: Registry::new(),
            lights: Registry::new(),
            decals: Registry::new(),
            static_cache: StaticCache::new(),
            bones: BoneBuffer::new(settings.bone_buffer_matrices),
            passes: PassSet::new(),
            lists: FrameLists::default(),
            visible: Vec::new(),
            cascade_visible: Default::default(),
            lods: Vec::new(),
            instances: Vec::new(),
            visible_decals: Vec::new(),
            shadow_scene_changed: false,
            stats: FrameStats::default(),
        }
    }

    pub fn register_obj(&mut self, object: RenderObject) -> ObjectHandle {
        if object.is_static() {
            self.static_cache.mark_dirty();
        }
        self.shadow_scene_changed = true;
        self.objects.register(object)
    }

    /// Replaces a proxy's description. Previous-frame state is carried over.
    pub fn update_obj(
        &mut self,
        handle: ObjectHandle,
        mut object: RenderObject,
    ) -> Result<(), RegistryError> {
        let previous = self.objects.get(handle)?;
        object.prev_transform = previous.prev_transform;
        object.prev_bone_offset = previous.prev_bone_offset;
        if object.bone_offset.is_none() {
            object.bone_offset = previous.bone_offset;
        }

        if previous.static_state_differs(&object) {
            self.static_cache.mark_dirty();
        }
        if previous.transform != object.transform
            || previous.model != object.model
            || previous.flags != object.flags
            || previous.material_override != object.material_override
        {
            self.shadow_scene_changed = true;
        }

        self.objects.update(handle, object)?;
        Ok(())
    }

    /// Invalidates `handle` now; the proxy is dropped at the start of the next
    /// frame build.
    pub fn remove_obj(&mut self, handle: ObjectHandle) -> Result<(), RegistryError> {
        if self.objects.get(handle)?.is_static() {
            self.static_cache.mark_dirty();
        }
        self.objects.free(handle)?;
        self.shadow_scene_changed = true;
        Ok(())
    }

    pub fn object(&self, handle: ObjectHandle) -> Result<&RenderObject, RegistryError> {
        self.objects.get(handle)
    }

    pub fn object_slot(&self, handle: ObjectHandle) -> Result<usize, RegistryError> {
        self.objects.slot_of(handle)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Stores this frame's skinning matrices for `handle`. Must be called
    /// every frame the object animates, before `build_scene_data`.
    pub fn upload_bones(&mut self, handle: ObjectHandle, bones: &[Mat4]) -> Result<u32, RegistryError> {
        let object = self.objects.get_mut(handle)?;
        let offset = self.bones.allocate(bones);
        object.bone_offset = Some(offset);
        Ok(offset)
    }

    pub fn register_light(&mut self, mut light: RenderLight) -> LightHandle {
        light.shadow_dirty = true;
        self.lights.register(light)
    }

    pub fn update_light(
        &mut self,
        handle: LightHandle,
        mut light: RenderLight,
    ) -> Result<(), RegistryError> {
        light.shadow_dirty = true;
        self.lights.update(handle, light)?;
        Ok(())
    }

    pub fn remove_light(&mut self, handle: LightHandle) -> Result<(), RegistryError> {
        self.lights.free(handle)
    }

    pub fn light(&self, handle: LightHandle) -> Result<&RenderLight, RegistryError> {
        self.lights.get(handle)
    }

    /// Forces the light's shadow list to be rebuilt next frame.
    pub fn invalidate_light_shadow(&mut self, handle: LightHandle) -> Result<(), RegistryError> {
        self.lights.get_mut(handle)?.shadow_dirty = true;
        Ok(())
    }

    pub fn register_decal(&mut self, decal: RenderDecal) -> DecalHandle {
        self.decals.register(decal)
    }

    pub fn update_decal(&mut self, handle: DecalHandle, decal: RenderDecal) -> Result<(), RegistryError> {
        self.decals.update(handle, decal)?;
        Ok(())
    }

    pub fn remove_decal(&mut self, handle: DecalHandle) -> Result<(), RegistryError> {
        self.decals.free(handle)
    }

    /// Call when a model used by static objects finishes loading.
    pub fn invalidate_static_cache(&mut self) {
        self.static_cache.mark_dirty();
    }

    pub fn static_cache(&self) -> &StaticCache {
        &self.static_cache
    }

    pub fn pass(&self, pass: RenderPass) -> &PassList {
        self.passes.get(pass)
    }

    pub fn lists(&self) -> &FrameLists {
        &self.lists
    }

    /// GPU records indexed by registry slot.
    pub fn object_instances(&self) -> &[ObjectInstance] {
        &self.instances
    }

    pub fn bones(&self) -> &BoneBuffer {
        &self.bones
    }

    /// Main-view visibility indexed by registry slot.
    pub fn visibility(&self) -> &[bool] {
        &self.visible
    }

    pub fn cascade_visibility(&self, cascade: usize) -> &[bool] {
        &self.cascade_visible[cascade]
    }

    pub fn lod_choices(&self) -> &[LodChoice] {
        &self.lods
    }

    /// Decals in the main view, ordered by ordinal.
    pub fn visible_decals(&self) -> &[DecalHandle] {
        &self.visible_decals
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Builds every pass and draw list for one frame.
    pub fn build_scene_data(
        &mut self,
        ctx: &mut RenderContext,
        view: &FrameView,
        models: &AssetCache<Model>,
        materials: &dyn MaterialQuery,
    ) {
        ctx.begin_frame();
        let settings = ctx.settings().clone();

        // Registry slots are stable from here until the next frame.
        self.objects.apply_deferred_frees();
        self.lights.apply_deferred_frees();
        self.decals.apply_deferred_frees();
        self.static_cache
            .track_inputs(view.mode, settings.depth_prepass_all);
        self.passes.clear();

        if std::mem::take(&mut self.shadow_scene_changed) {
            for light in self.lights.values_mut() {
                light.shadow_dirty |= light.casts_shadow;
            }
        }

        let spheres: Arc<[Vec4]> = self
            .objects
            .values()
            .iter()
            .map(|object| {
                let model = object.model.and_then(|handle| models.get(handle));
                object.world_bounds(model).to_vec4()
            })
            .collect();
        let count = spheres.len();

        let spots: Vec<(LightHandle, Frustum)> = if view.skybox_only {
            Vec::new()
        } else {
            self.lights
                .iter()
                .filter(|(_, light)| light.needs_shadow_update())
                .filter_map(|(handle, light)| match light.kind {
                    LightKind::Spot {
                        direction,
                        outer_angle,
                        ..
                    } => Some((
                        handle,
                        Frustum::from_spotlight(light.position, direction, outer_angle),
                    )),
                    _ => None,
                })
                .collect()
        };

        let decal_spheres: Arc<[Vec4]> = self
            .decals
            .values()
            .iter()
            .map(|decal| decal.world_bounds().to_vec4())
            .collect();

        let frustum = view.frustum();
        // Every job owns one buffer and sends it back when done.
        let (culled_tx, culled_rx) = crossbeam_channel::unbounded::<Culled>();
        let mut jobs: Vec<Job> = Vec::with_capacity(2 + SHADOW_CASCADES + spots.len());
        jobs.push(cull_job(
            CullTarget::Main,
            frustum,
            Arc::clone(&spheres),
            visibility_buffer(std::mem::take(&mut self.visible), count),
            culled_tx.clone(),
        ));
        for cascade in 0..SHADOW_CASCADES {
            jobs.push(cull_job(
                CullTarget::Cascade(cascade),
                view.cascade_frustum(cascade),
                Arc::clone(&spheres),
                visibility_buffer(std::mem::take(&mut self.cascade_visible[cascade]), count),
                culled_tx.clone(),
            ));
        }
        for (index, (_, spot_frustum)) in spots.iter().enumerate() {
            jobs.push(cull_job(
                CullTarget::Spot(index),
                *spot_frustum,
                Arc::clone(&spheres),
                visibility_buffer(Vec::new(), count),
                culled_tx.clone(),
            ));
        }
        if !decal_spheres.is_empty() {
            let buffer = visibility_buffer(Vec::new(), decal_spheres.len());
            jobs.push(cull_job(
                CullTarget::Decals,
                frustum,
                decal_spheres,
                buffer,
                culled_tx.clone(),
            ));
        }
        drop(culled_tx);

        let mut cull_counter = None;
        ctx.jobs.add_jobs(jobs, &mut cull_counter);

        // LOD selection and the static cache overlap with culling.
        let objects = &self.objects;
        compute_lods(
            &spheres,
            view.origin(),
            view.inv_tan_half_fov(),
            settings.transparent_sort_distance,
            |slot| {
                objects
                    .values()
                    .get(slot)
                    .and_then(|object| drawable_model(object, models))
                    .map(|model| model.lods.as_slice())
            },
            &mut self.lods,
        );

        let classifier = Classifier {
            materials,
            mode: view.mode,
            depth_prepass_all: settings.depth_prepass_all,
        };
        if !view.skybox_only {
            self.static_cache
                .rebuild_if_dirty(&classifier, &self.objects, models);
        }

        ctx.jobs.wait_and_free_counter(&mut cull_counter);

        let mut spot_vis: Vec<Vec<bool>> = vec![Vec::new(); spots.len()];
        let mut decal_vis = Vec::new();
        for Culled { target, visible } in culled_rx.try_iter() {
            match target {
                CullTarget::Main => self.visible = visible,
                CullTarget::Cascade(cascade) => self.cascade_visible[cascade] = visible,
                CullTarget::Spot(index) => spot_vis[index] = visible,
                CullTarget::Decals => decal_vis = visible,
            }
        }

        let mut visible_decals: Vec<(u32, DecalHandle)> = decal_vis
            .iter()
            .zip(self.decals.values())
            .enumerate()
            .filter(|(_, (visible, _))| **visible)
            .filter_map(|(slot, (_, decal))| {
                self.decals
                    .handle_at(slot)
                    .map(|handle| (decal.ordinal, handle))
            })
            .collect();
        visible_decals.sort_by_key(|&(ordinal, _)| ordinal);
        self.visible_decals.clear();
        self.visible_decals
            .extend(visible_decals.into_iter().map(|(_, handle)| handle));

        let snapshot: Arc<[RenderObject]> = Arc::from(self.objects.values());
        let mut records = std::mem::take(&mut self.instances);
        records.clear();
        records.reserve(count);
        let (instances_tx, instances_rx) = crossbeam_channel::bounded(1);
        let mut instance_counter = None;
        ctx.jobs.add_job(
            object_instances_job(
                snapshot,
                self.bones.front_base(),
                self.bones.back_base(),
                records,
                instances_tx,
            ),
            &mut instance_counter,
        );

        for (slot, object) in self.objects.values().iter().enumerate() {
            if !object.flags.contains(ObjectFlags::VISIBLE) {
                continue;
            }
            if view.skybox_only {
                if !object.is_skybox() {
                    continue;
                }
            } else if object.is_static() && !object.is_skybox() {
                continue;
            }

            let (Some(handle), Some(model)) =
                (self.objects.handle_at(slot), drawable_model(object, models))
            else {
                continue;
            };
            let choice = self.lods[slot];
            classifier.classify(
                &Candidate {
                    handle,
                    slot: slot as u32,
                    object,
                    model,
                    lod: choice.lod as usize,
                    in_view: self.visible[slot],
                    casts_shadow: object.flags.contains(ObjectFlags::SHADOW_CASTER),
                    distance: choice.distance,
                },
                &mut self.passes,
            );
        }

        let static_merged = if view.skybox_only {
            0
        } else {
            self.static_cache
                .merge_into(&mut self.passes, &self.objects, &self.visible, &self.lods)
        };

        for pass in RenderPass::ALL {
            make_batches(self.passes.get_mut(pass), settings.better_depth_batching);
        }

        ctx.jobs.wait_and_free_counter(&mut instance_counter);
        self.instances = instances_rx.try_recv().unwrap_or_default();

        let arena = &mut ctx.arena;
        self.lists.gbuffer.build_from(arena, &self.passes.opaque, None);
        self.lists
            .transparent
            .build_from(arena, &self.passes.transparent, None);
        self.lists
            .depth_prepass
            .build_from(arena, &self.passes.depth_prepass, None);
        self.lists
            .editor_selection
            .build_from(arena, &self.passes.editor_selection, None);

        for (list, visible) in self.lists.cascades.iter_mut().zip(&self.cascade_visible) {
            list.build_from(arena, &self.passes.shadow, Some(visible.as_slice()));
            if settings.collapse_shadow_commands {
                list.collapse_zero_instance_commands();
            }
        }

        let lights = &self.lights;
        self.lists
            .spot_shadows
            .retain(|spot| lights.contains(spot.light));
        for ((handle, _), visible) in spots.iter().zip(&spot_vis) {
            let index = match self
                .lists
                .spot_shadows
                .iter()
                .position(|spot| spot.light == *handle)
            {
                Some(index) => index,
                None => {
                    self.lists.spot_shadows.push(SpotShadowList {
                        light: *handle,
                        list: RenderList::new(),
                    });
                    self.lists.spot_shadows.len() - 1
                }
            };

            let list = &mut self.lists.spot_shadows[index].list;
            list.build_from(arena, &self.passes.shadow, Some(visible.as_slice()));
            if settings.collapse_shadow_commands {
                list.collapse_zero_instance_commands();
            }
            if let Ok(light) = self.lights.get_mut(*handle) {
                light.shadow_dirty = false;
            }
        }

        self.stats = FrameStats {
            objects: count,
            visible: self.visible.iter().filter(|&&visible| visible).count(),
            pass_objects: self.passes.object_count(),
            static_merged,
            mesh_batches: RenderPass::ALL
                .iter()
                .map(|&pass| self.passes.get(pass).mesh_batches.len())
                .sum(),
            multidraw_batches: RenderPass::ALL
                .iter()
                .map(|&pass| self.passes.get(pass).multidraw_batches.len())
                .sum(),
            spot_shadows_rebuilt: spots.len(),
            triangles: self.lists.gbuffer.triangle_count()
                + self.lists.transparent.triangle_count(),
        };
        debug!("Frame built: {:?}", self.stats);

        for object in self.objects.values_mut() {
            object.prev_transform = object.transform;
            object.prev_bone_offset = object.bone_offset.take();
        }
        self.bones.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Handle, Submesh};
    use crate::renderer::material::MaterialLibrary;
    use crate::scene::camera::Camera;
    use glam::Vec3;

    fn setup() -> (RenderContext, RenderScene, AssetCache<Model>, MaterialLibrary) {
        let settings = RenderSettings {
            synchronous_jobs: true,
            worker_threads: 1,
            scratch_arena_words: 1024,
            bone_buffer_matrices: 16,
            ..RenderSettings::default()
        };
        let ctx = RenderContext::new(settings.clone()).unwrap();
        let scene = RenderScene::new(&settings);
        let mut models = AssetCache::new();
        models.insert(Model::new(
            1,
            vec![Submesh {
                material_index: 0,
                base_vertex: 0,
                first_index: 0,
                index_count: 36,
            }],
            vec![Handle::new(0)],
        ));
        (ctx, scene, models, MaterialLibrary::default())
    }

    fn view() -> FrameView {
        FrameView::from_camera(&Camera::default(), 1.0)
    }

    #[test]
    fn previous_transform_follows_last_frame() {
        let (mut ctx, mut scene, models, materials) = setup();
        let start = Mat4::IDENTITY;
        let moved = Mat4::from_translation(Vec3::X);
        let handle = scene.register_obj(RenderObject::new(Handle::new(0), start));

        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        scene.update_obj(handle, RenderObject::new(Handle::new(0), moved)).unwrap();
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);

        let instance = scene.object_instances()[0];
        assert_eq!(instance.model, moved.to_cols_array_2d());
        assert_eq!(instance.prev_model, start.to_cols_array_2d());
    }

    #[test]
    fn uploaded_bones_reach_the_instance_record() {
        let (mut ctx, mut scene, models, materials) = setup();
        let handle = scene.register_obj(RenderObject::new(Handle::new(0), Mat4::IDENTITY));
        scene.upload_bones(handle, &[Mat4::IDENTITY; 4]).unwrap();
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);

        let instance = scene.object_instances()[0];
        assert_eq!(instance.bone_offset, 0);
        assert_eq!(scene.object(handle).unwrap().bone_offset, None);
        assert_eq!(scene.bones().front_base(), 16);
    }

    #[test]
    fn freed_objects_leave_on_next_build() {
        let (mut ctx, mut scene, models, materials) = setup();
        let a = scene.register_obj(RenderObject::new(Handle::new(0), Mat4::IDENTITY));
        let b = scene.register_obj(RenderObject::new(Handle::new(0), Mat4::IDENTITY));
        scene.remove_obj(a).unwrap();
        assert!(scene.object(a).is_err());
        assert_eq!(scene.object_count(), 2);

        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert_eq!(scene.object_count(), 1);
        assert_eq!(scene.object_slot(b).unwrap(), 0);
        assert_eq!(scene.lists().gbuffer.instance_to_slot, vec![0]);
    }

    #[test]
    fn spot_shadow_lists_rebuild_only_when_dirty() {
        let (mut ctx, mut scene, models, materials) = setup();
        scene.register_obj(RenderObject::new(Handle::new(0), Mat4::IDENTITY));
        let light = scene.register_light(RenderLight::spot(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::NEG_Y,
            20.0,
            0.6,
        ));

        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert_eq!(scene.stats().spot_shadows_rebuilt, 1);
        assert_eq!(scene.lists().spot_shadow(light).unwrap().instance_count(), 1);
        assert!(!scene.light(light).unwrap().is_shadow_dirty());

        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert_eq!(scene.stats().spot_shadows_rebuilt, 0);
        assert!(scene.lists().spot_shadow(light).is_some());

        scene.invalidate_light_shadow(light).unwrap();
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert_eq!(scene.stats().spot_shadows_rebuilt, 1);

        scene.remove_light(light).unwrap();
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert!(scene.lists().spot_shadow(light).is_none());
    }

    #[test]
    fn hiding_an_object_clears_it_from_spot_shadows() {
        let (mut ctx, mut scene, models, materials) = setup();
        let handle = scene.register_obj(RenderObject::new(Handle::new(0), Mat4::IDENTITY));
        let light = scene.register_light(RenderLight::spot(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::NEG_Y,
            20.0,
            0.6,
        ));
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert_eq!(scene.lists().spot_shadow(light).unwrap().instance_count(), 1);

        scene
            .update_obj(
                handle,
                RenderObject::new(Handle::new(0), Mat4::IDENTITY).with_flags(ObjectFlags::empty()),
            )
            .unwrap();
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);

        assert_eq!(scene.stats().spot_shadows_rebuilt, 1);
        assert_eq!(scene.stats().pass_objects, 0);
        assert_eq!(scene.lists().spot_shadow(light).unwrap().instance_count(), 0);
    }

    #[test]
    fn material_override_change_rebuilds_spot_shadows() {
        let (mut ctx, mut scene, models, materials) = setup();
        let handle = scene.register_obj(RenderObject::new(Handle::new(0), Mat4::IDENTITY));
        scene.register_light(RenderLight::spot(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::NEG_Y,
            20.0,
            0.6,
        ));
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert_eq!(scene.stats().spot_shadows_rebuilt, 0);

        scene
            .update_obj(
                handle,
                RenderObject::new(Handle::new(0), Mat4::IDENTITY).with_material_override(Handle::new(0)),
            )
            .unwrap();
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);
        assert_eq!(scene.stats().spot_shadows_rebuilt, 1);
    }

    #[test]
    fn decals_are_culled_and_ordered() {
        let (mut ctx, mut scene, models, materials) = setup();
        let mut far = RenderDecal::new(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)), Handle::new(0));
        far.ordinal = 2;
        let mut near = RenderDecal::new(Mat4::IDENTITY, Handle::new(0));
        near.ordinal = 1;
        let hidden = RenderDecal::new(Mat4::from_translation(Vec3::new(500.0, 0.0, 0.0)), Handle::new(0));

        let far = scene.register_decal(far);
        let near = scene.register_decal(near);
        scene.register_decal(hidden);
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);

        assert_eq!(scene.visible_decals(), &[near, far]);
    }

    #[test]
    fn decal_order_survives_slot_moves() {
        let (mut ctx, mut scene, models, materials) = setup();
        let decal = |ordinal| {
            let mut decal = RenderDecal::new(Mat4::IDENTITY, Handle::new(0));
            decal.ordinal = ordinal;
            decal
        };
        let first = scene.register_decal(decal(5));
        let second = scene.register_decal(decal(9));
        let third = scene.register_decal(decal(1));
        scene.remove_decal(first).unwrap();
        scene.build_scene_data(&mut ctx, &view(), &models, &materials);

        // The last decal was swapped into the freed slot.
        assert_eq!(scene.visible_decals(), &[third, second]);
    }

    #[test]
    fn skybox_only_builds_ignore_world_geometry() {
        let (mut ctx, mut scene, models, materials) = setup();
        scene.register_obj(RenderObject::new(Handle::new(0), Mat4::IDENTITY));
        scene.register_obj(
            RenderObject::new(Handle::new(0), Mat4::IDENTITY)
                .with_flags(ObjectFlags::VISIBLE | ObjectFlags::SKYBOX),
        );

        let mut capture = view();
        capture.skybox_only = true;
        scene.build_scene_data(&mut ctx, &capture, &models, &materials);
        assert_eq!(scene.pass(RenderPass::Opaque).len(), 1);
        assert_eq!(scene.pass(RenderPass::Opaque).objects[0].slot, 1);
    }
}
