use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use render_lists::asset::{Assets, Handle, Model, Submesh};
use render_lists::renderer::{BlendMode, DrawCommand, Material, MaterialLibrary, RenderPass};
use render_lists::scene::{Camera, ObjectFlags, RenderObject, ViewMode};
use render_lists::settings::DrawSubmission;
use render_lists::{FrameView, RenderContext, RenderScene, RenderSettings};

struct World {
    ctx: RenderContext,
    scene: RenderScene,
    assets: Assets,
    opaque_model: Handle<Model>,
    glass_model: Handle<Model>,
    broken_material: Handle<Material>,
}

fn cube_submesh() -> Vec<Submesh> {
    vec![Submesh {
        material_index: 0,
        base_vertex: 0,
        first_index: 0,
        index_count: 36,
    }]
}

fn world(synchronous: bool) -> World {
    render_lists::init_logging();
    let settings = RenderSettings {
        synchronous_jobs: synchronous,
        worker_threads: 2,
        scratch_arena_words: 1 << 16,
        bone_buffer_matrices: 64,
        transparent_sort_distance: 100.0,
        ..RenderSettings::default()
    };
    let ctx = RenderContext::new(settings.clone()).unwrap();
    let scene = RenderScene::new(&settings);

    let mut materials = MaterialLibrary::default();
    let stone = materials.insert(Material::new(1).with_texture_set(10));
    let glass = materials.insert(Material::new(2).with_blend(BlendMode::AlphaBlend));
    let broken_material = materials.insert(Material::new(3).with_gpu_index(None));

    let mut assets = Assets::new(materials);
    let opaque_model = assets
        .models
        .insert(Model::new(1, cube_submesh(), vec![stone]));
    let glass_model = assets
        .models
        .insert(Model::new(2, cube_submesh(), vec![glass]));

    World {
        ctx,
        scene,
        assets,
        opaque_model,
        glass_model,
        broken_material,
    }
}

impl World {
    fn build(&mut self) {
        self.build_in(ViewMode::default());
    }

    fn build_in(&mut self, mode: ViewMode) {
        let view = FrameView::from_camera(&Camera::default(), 16.0 / 9.0).with_mode(mode);
        self.scene
            .build_scene_data(&mut self.ctx, &view, &self.assets.models, &self.assets.materials);
    }
}

fn at(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

#[test]
fn static_opaque_and_dynamic_transparent_frame() {
    let mut w = world(false);
    let static_flags = ObjectFlags::default() | ObjectFlags::STATIC;
    for x in [-1.0, 0.0, 1.0] {
        w.scene
            .register_obj(RenderObject::new(w.opaque_model, at(x, 0.0, -4.0)).with_flags(static_flags));
    }
    w.scene
        .register_obj(RenderObject::new(w.glass_model, at(0.0, 0.5, -2.0)));
    w.build();

    let opaque = w.scene.pass(RenderPass::Opaque);
    assert_eq!(opaque.len(), 3);
    assert_eq!(opaque.mesh_batches.len(), 1);
    assert_eq!(opaque.mesh_batches[0].object_count, 3);
    assert_eq!(opaque.multidraw_batches.len(), 1);

    let transparent = w.scene.pass(RenderPass::Transparent);
    assert_eq!(transparent.len(), 1);
    assert_eq!(transparent.mesh_batches.len(), 1);
    assert_eq!(transparent.mesh_batches[0].object_count, 1);

    let lists = w.scene.lists();
    assert_eq!(lists.gbuffer.commands.len(), 1);
    assert_eq!(lists.gbuffer.commands[0].instance_count, 3);
    assert_eq!(lists.transparent.instance_count(), 1);
    assert_eq!(lists.transparent.instance_to_slot, vec![3]);
    // Three gbuffer entries plus three shadow casters.
    assert_eq!(w.scene.stats().static_merged, 6);
}

#[test]
fn invisible_non_casters_contribute_nothing() {
    let mut w = world(true);
    let hidden = ObjectFlags::empty();
    w.scene
        .register_obj(RenderObject::new(w.opaque_model, at(0.0, 0.0, -4.0)).with_flags(hidden));
    w.scene.register_obj(
        RenderObject::new(w.opaque_model, at(1.0, 0.0, -4.0))
            .with_flags(hidden | ObjectFlags::STATIC),
    );
    w.build();

    assert_eq!(w.scene.stats().pass_objects, 0);
    for pass in RenderPass::ALL {
        assert!(w.scene.pass(pass).is_empty());
    }
    assert!(w.scene.lists().gbuffer.is_empty());
    // Instance records still exist for every slot.
    assert_eq!(w.scene.object_instances().len(), 2);
}

#[test]
fn transparent_objects_draw_back_to_front() {
    let mut w = world(false);
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    for _ in 0..32 {
        let position = at(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-40.0..-1.0),
        );
        w.scene.register_obj(RenderObject::new(w.glass_model, position));
    }
    w.build();

    let transparent = w.scene.pass(RenderPass::Transparent);
    assert_eq!(transparent.len(), 32);
    assert_eq!(transparent.mesh_batches.len(), 32);
    for pair in transparent.objects.windows(2) {
        assert!(pair[0].sort_key.distance >= pair[1].sort_key.distance);
    }

    let eye = Camera::default().position();
    let farthest = (0..32)
        .max_by(|&a, &b| {
            let da = w.scene.object_instances()[a].model[3];
            let db = w.scene.object_instances()[b].model[3];
            let da = Vec3::new(da[0], da[1], da[2]).distance(eye);
            let db = Vec3::new(db[0], db[1], db[2]).distance(eye);
            da.total_cmp(&db)
        })
        .unwrap();
    assert_eq!(w.scene.lists().transparent.instance_to_slot[0], farthest as u32);
}

#[test]
fn every_pass_object_lands_in_exactly_one_instance() {
    let mut rng = SmallRng::seed_from_u64(42);
    for synchronous in [true, false] {
        let mut w = world(synchronous);
        for _ in 0..64 {
            let model = if rng.gen_bool(0.3) {
                w.glass_model
            } else {
                w.opaque_model
            };
            let mut flags = ObjectFlags::default();
            if rng.gen_bool(0.4) {
                flags |= ObjectFlags::STATIC;
            }
            if rng.gen_bool(0.2) {
                flags |= ObjectFlags::SORT_FIRST;
            }
            let position = at(
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-60.0..10.0),
            );
            w.scene
                .register_obj(RenderObject::new(model, position).with_flags(flags));
        }
        w.build();

        let lists = w.scene.lists();
        for (pass, list) in [
            (RenderPass::Opaque, &lists.gbuffer),
            (RenderPass::Transparent, &lists.transparent),
            (RenderPass::DepthPrepass, &lists.depth_prepass),
        ] {
            let pass = w.scene.pass(pass);
            let batched: u32 = pass.mesh_batches.iter().map(|b| b.object_count).sum();
            assert_eq!(batched as usize, pass.len());
            assert_eq!(list.instance_count() as usize, pass.len());

            let mut slots: Vec<u32> = pass.objects.iter().map(|o| o.slot).collect();
            let mut listed = list.instance_to_slot.clone();
            slots.sort_unstable();
            listed.sort_unstable();
            assert_eq!(slots, listed);
        }

        // Visible objects appear in either the opaque or the transparent pass.
        let visible = w.scene.visibility().iter().filter(|v| **v).count();
        assert_eq!(
            w.scene.pass(RenderPass::Opaque).len() + w.scene.pass(RenderPass::Transparent).len(),
            visible
        );
    }
}

#[test]
fn static_cache_rebuilds_once_per_invalidation() {
    let mut w = world(true);
    let flags = ObjectFlags::default() | ObjectFlags::STATIC;
    let handle = w
        .scene
        .register_obj(RenderObject::new(w.opaque_model, at(0.0, 0.0, -4.0)).with_flags(flags));

    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 1);
    w.build();
    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 1);

    // Moving a static object keeps its cached entries.
    w.scene
        .update_obj(
            handle,
            RenderObject::new(w.opaque_model, at(0.5, 0.0, -4.0)).with_flags(flags),
        )
        .unwrap();
    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 1);

    // A model swap through update_obj alone triggers exactly one rebuild.
    w.scene
        .update_obj(
            handle,
            RenderObject::new(w.glass_model, at(0.5, 0.0, -4.0)).with_flags(flags),
        )
        .unwrap();
    assert!(w.scene.static_cache().is_dirty());
    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 2);
    assert_eq!(w.scene.pass(RenderPass::Transparent).len(), 1);
    assert!(w.scene.pass(RenderPass::Opaque).is_empty());

    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 2);

    w.scene.invalidate_static_cache();
    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 3);
}

#[test]
fn static_material_override_change_rebuilds_cache() {
    let mut w = world(true);
    let flags = ObjectFlags::default() | ObjectFlags::STATIC;
    let handle = w
        .scene
        .register_obj(RenderObject::new(w.opaque_model, at(0.0, 0.0, -4.0)).with_flags(flags));
    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 1);

    w.scene
        .update_obj(
            handle,
            RenderObject::new(w.opaque_model, at(0.0, 0.0, -4.0))
                .with_flags(flags)
                .with_material_override(w.broken_material),
        )
        .unwrap();
    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 2);
    assert_eq!(w.scene.pass(RenderPass::Opaque).objects[0].material, Handle::new(0));
}

#[test]
fn view_mode_toggle_rebuilds_static_cache() {
    let mut w = world(true);
    let flags = ObjectFlags::default() | ObjectFlags::STATIC | ObjectFlags::OUTLINE;
    w.scene
        .register_obj(RenderObject::new(w.opaque_model, at(0.0, 0.0, -4.0)).with_flags(flags));
    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 1);
    assert!(w.scene.pass(RenderPass::EditorSelection).is_empty());

    let editor = ViewMode {
        editor: true,
        debug: false,
    };
    w.build_in(editor);
    assert_eq!(w.scene.static_cache().rebuild_count(), 2);
    assert_eq!(w.scene.pass(RenderPass::EditorSelection).len(), 1);

    w.build_in(editor);
    assert_eq!(w.scene.static_cache().rebuild_count(), 2);

    w.build();
    assert_eq!(w.scene.static_cache().rebuild_count(), 3);
    assert!(w.scene.pass(RenderPass::EditorSelection).is_empty());
}

#[test]
fn depth_prepass_setting_reaches_static_objects() {
    let mut w = world(true);
    let static_flags = ObjectFlags::default() | ObjectFlags::STATIC;
    w.scene
        .register_obj(RenderObject::new(w.opaque_model, at(-1.0, 0.0, -4.0)).with_flags(static_flags));
    w.scene
        .register_obj(RenderObject::new(w.opaque_model, at(1.0, 0.0, -4.0)));
    w.build();
    assert!(w.scene.pass(RenderPass::DepthPrepass).is_empty());

    let settings = RenderSettings {
        depth_prepass_all: true,
        ..w.ctx.settings().clone()
    };
    w.ctx.apply_settings(settings);
    w.build();

    assert_eq!(w.scene.pass(RenderPass::Opaque).len(), 2);
    assert_eq!(w.scene.pass(RenderPass::DepthPrepass).len(), 2);
    assert_eq!(w.scene.static_cache().rebuild_count(), 2);
}

#[test]
fn unusable_material_falls_back() {
    let mut w = world(true);
    w.scene.register_obj(
        RenderObject::new(w.opaque_model, at(0.0, 0.0, -4.0))
            .with_material_override(w.broken_material),
    );
    w.build();

    let opaque = w.scene.pass(RenderPass::Opaque);
    assert_eq!(opaque.len(), 1);
    assert_eq!(opaque.objects[0].material, Handle::new(0));
}

#[test]
fn discrete_and_indirect_encodings_agree() {
    let mut w = world(true);
    for x in 0..4 {
        w.scene
            .register_obj(RenderObject::new(w.opaque_model, at(x as f32 * 0.5, 0.0, -6.0)));
    }
    w.scene
        .register_obj(RenderObject::new(w.glass_model, at(0.0, 0.0, -3.0)));
    w.build();

    let lists = w.scene.lists();
    let mut indirect = Vec::new();
    lists.encode_main_view(DrawSubmission::Indirect, None, &mut indirect);
    let mut discrete = Vec::new();
    lists.encode_main_view(DrawSubmission::Discrete, None, &mut discrete);

    let multidraws = indirect
        .iter()
        .filter(|cmd| matches!(cmd, DrawCommand::MultiDrawIndirect { .. }))
        .count();
    assert_eq!(multidraws, 2);
    assert!(!indirect.iter().any(|cmd| matches!(cmd, DrawCommand::DrawCall { .. })));

    let draws: Vec<u32> = discrete
        .iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::DrawCall { instance, .. } => Some(*instance),
            _ => None,
        })
        .collect();
    assert_eq!(draws.len() as u32, lists.gbuffer.instance_count() + lists.transparent.instance_count());

    let pipelines = |cmds: &[DrawCommand]| {
        cmds.iter()
            .filter(|cmd| matches!(cmd, DrawCommand::SetPipeline(_)))
            .count()
    };
    assert_eq!(pipelines(&indirect), pipelines(&discrete));
}
