use std::cmp::Ordering;

use super::pass::{MeshBatch, MultidrawBatch, PassList, PassObject, RenderPass};

/// Sorts a pass and groups it into mesh batches (one instanced draw each) and
/// multidraw batches (one multi-draw call each). Every object's `batch` is set
/// to its mesh batch.
///
/// Batching an already batched list reproduces the same batches.
pub fn make_batches(list: &mut PassList, better_depth_batching: bool) {
    list.mesh_batches.clear();
    list.multidraw_batches.clear();
    if list.objects.is_empty() {
        return;
    }

    let pass = list.pass;
    sort_pass_objects(pass, &mut list.objects);

    let mut start = 0;
    for end in 1..=list.objects.len() {
        let boundary = end == list.objects.len()
            || !same_mesh_batch(pass, &list.objects[start], &list.objects[end]);
        if !boundary {
            continue;
        }

        let batch_index = list.mesh_batches.len() as u32;
        let first = &list.objects[start];
        list.mesh_batches.push(MeshBatch {
            first_object: start as u32,
            object_count: (end - start) as u32,
            draw: first.draw,
            material_gpu_index: first.material_gpu_index,
        });
        for object in &mut list.objects[start..end] {
            object.batch = batch_index;
        }
        start = end;
    }

    // Each head is compared with the first object of the current run, whose
    // texture set is the one bound for the whole multidraw.
    let merge_textures = better_depth_batching && pass.is_depth_only();
    let mut leader: Option<usize> = None;
    for (index, batch) in list.mesh_batches.iter().enumerate() {
        let head = &list.objects[batch.first_object as usize];

        if let (Some(current), Some(leader)) = (list.multidraw_batches.last_mut(), leader) {
            if can_multidraw(&list.objects[leader], head, merge_textures) {
                current.mesh_batch_count += 1;
                continue;
            }
        }

        leader = Some(batch.first_object as usize);

        list.multidraw_batches.push(MultidrawBatch {
            first_mesh_batch: index as u32,
            mesh_batch_count: 1,
            key: head.sort_key,
        });
    }
}

fn sort_pass_objects(pass: RenderPass, objects: &mut [PassObject]) {
    if pass.requires_back_to_front_sort() {
        objects.sort_by(compare_back_to_front);
    } else {
        objects.sort_by(compare_by_state);
    }
}

fn compare_by_state(a: &PassObject, b: &PassObject) -> Ordering {
    a.sort_key
        .cmp(&b.sort_key)
        .then(a.submesh.cmp(&b.submesh))
        .then(a.material.index().cmp(&b.material.index()))
}

fn compare_back_to_front(a: &PassObject, b: &PassObject) -> Ordering {
    a.sort_key
        .blend
        .cmp(&b.sort_key.blend)
        .then(b.sort_key.distance.cmp(&a.sort_key.distance))
        .then(a.submesh.cmp(&b.submesh))
}

fn same_mesh_batch(pass: RenderPass, a: &PassObject, b: &PassObject) -> bool {
    !pass.requires_back_to_front_sort()
        && a.sort_key == b.sort_key
        && a.submesh == b.submesh
        && a.material == b.material
}

/// Alpha-tested members always share the leader's texture set, so the run
/// can bind the leader's textures for every draw.
fn can_multidraw(leader: &PassObject, head: &PassObject, merge_textures: bool) -> bool {
    if !leader.sort_key.same_pipeline(&head.sort_key) {
        return false;
    }
    leader.sort_key.texture_set == head.sort_key.texture_set
        || (merge_textures && !leader.alpha_tested && !head.alpha_tested)
}
