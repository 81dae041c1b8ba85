use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use crossbeam_channel::Sender;
use log::warn;

use crate::jobs::Job;
use crate::scene::render_object::{ObjectFlags, RenderObject};

pub const INSTANCE_SKINNED: u32 = 1 << 0;
pub const INSTANCE_NO_TAA: u32 = 1 << 1;

/// Per-object record uploaded once per frame, indexed by registry slot.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, PartialEq)]
pub struct ObjectInstance {
    pub model: [[f32; 4]; 4],      // 64 bytes
    pub prev_model: [[f32; 4]; 4], // 64 bytes
    pub bone_offset: u32,          // 4 bytes
    pub prev_bone_offset: u32,     // 4 bytes
    pub flags: u32,                // 4 bytes
    pub _padding: u32,             // 4 bytes (ensures 144 byte stride)
}

impl ObjectInstance {
    /// `front_base` and `back_base` are the bone buffer halves written this
    /// frame and last frame.
    pub fn from_object(object: &RenderObject, front_base: u32, back_base: u32) -> Self {
        let bone_offset = object.bone_offset.map(|ofs| front_base + ofs);
        // Objects that just started animating reuse this frame's bones.
        let prev_bone_offset = match object.prev_bone_offset {
            Some(ofs) => Some(back_base + ofs),
            None => bone_offset,
        };

        let mut flags = 0;
        if bone_offset.is_some() {
            flags |= INSTANCE_SKINNED;
        }
        if object.flags.contains(ObjectFlags::NO_TAA) {
            flags |= INSTANCE_NO_TAA;
        }

        Self {
            model: object.transform.to_cols_array_2d(),
            prev_model: object.prev_transform.to_cols_array_2d(),
            bone_offset: bone_offset.unwrap_or(0),
            prev_bone_offset: prev_bone_offset.unwrap_or(0),
            flags,
            _padding: 0,
        }
    }
}

/// Fills `out` with one record per object and sends it back through `done`.
pub(crate) fn object_instances_job(
    objects: Arc<[RenderObject]>,
    front_base: u32,
    back_base: u32,
    mut out: Vec<ObjectInstance>,
    done: Sender<Vec<ObjectInstance>>,
) -> Job {
    Box::new(move || {
        out.clear();
        out.extend(
            objects
                .iter()
                .map(|object| ObjectInstance::from_object(object, front_base, back_base)),
        );
        if done.send(out).is_err() {
            warn!("Object instance records dropped");
        }
    })
}
