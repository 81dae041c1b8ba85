use std::sync::Arc;

use crossbeam_channel::Sender;
use glam::Vec4;
use log::warn;

use crate::jobs::Job;
use crate::scene::frustum::{cull_spheres, Frustum};

/// Visibility buffer a culling job fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CullTarget {
    Main,
    Cascade(usize),
    Spot(usize),
    Decals,
}

pub(crate) struct Culled {
    pub target: CullTarget,
    pub visible: Vec<bool>,
}

/// Clears `buffer` and sizes it for `len` spheres. Called on the main thread
/// before dispatch so jobs never allocate.
pub(crate) fn visibility_buffer(mut buffer: Vec<bool>, len: usize) -> Vec<bool> {
    buffer.clear();
    buffer.resize(len, false);
    buffer
}

/// The job owns `buffer` while it runs and sends it back filled, one flag per
/// sphere. No two jobs ever touch the same buffer.
pub(crate) fn cull_job(
    target: CullTarget,
    frustum: Frustum,
    spheres: Arc<[Vec4]>,
    mut buffer: Vec<bool>,
    done: Sender<Culled>,
) -> Job {
    debug_assert_eq!(buffer.len(), spheres.len());
    Box::new(move || {
        cull_spheres(&frustum, &spheres, &mut buffer);
        if let Err(err) = done.send(Culled {
            target,
            visible: buffer,
        }) {
            warn!("Culling result for {:?} dropped", err.into_inner().target);
        }
    })
}
