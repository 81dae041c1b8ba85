use glam::{Vec3, Vec4};

use crate::asset::Lod;

/// Squared fraction of the screen height covered by a bounding sphere.
#[inline]
pub fn screen_percentage_sq(sphere: Vec4, inv_tan_half_fov_sq: f32, distance_sq: f32) -> f32 {
    sphere.w * sphere.w * inv_tan_half_fov_sq / distance_sq
}

/// Picks the least detailed LOD whose `end_percentage` still covers
/// `percentage_sq`, falling back to LOD 0. NaN (camera inside the sphere
/// centre) also selects LOD 0.
pub fn select_lod(lods: &[Lod], percentage_sq: f32) -> usize {
    (1..lods.len())
        .rev()
        .find(|&i| percentage_sq <= lods[i].end_percentage)
        .unwrap_or(0)
}

/// Linear remap of a squared distance onto `0..=max_output`, clamped.
#[inline]
pub fn quantize_distance(distance_sq: f32, max_distance_sq: f32, max_output: u16) -> u16 {
    if !(max_distance_sq > 0.0) || !distance_sq.is_finite() {
        return if distance_sq > 0.0 { max_output } else { 0 };
    }
    let t = (distance_sq / max_distance_sq).clamp(0.0, 1.0);
    (t * max_output as f32).round() as u16
}

/// Per-object LOD index and camera distance for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LodChoice {
    pub lod: u8,
    pub distance: u16,
}

/// Computes a [`LodChoice`] for every sphere, indexed like `spheres`.
/// `lods_for` returns the LOD table of the object in a slot, if any.
pub fn compute_lods<'a, F>(
    spheres: &[Vec4],
    origin: Vec3,
    inv_tan_half_fov: f32,
    max_sort_distance: f32,
    mut lods_for: F,
    out: &mut Vec<LodChoice>,
) where
    F: FnMut(usize) -> Option<&'a [Lod]>,
{
    let inv_tan_sq = inv_tan_half_fov * inv_tan_half_fov;
    let max_distance_sq = max_sort_distance * max_sort_distance;

    out.clear();
    out.extend(spheres.iter().enumerate().map(|(slot, sphere)| {
        let to_camera = sphere.truncate() - origin;
        let distance_sq = to_camera.length_squared();
        let lod = match lods_for(slot) {
            Some(lods) => select_lod(lods, screen_percentage_sq(*sphere, inv_tan_sq, distance_sq)),
            None => 0,
        };
        LodChoice {
            lod: lod.min(u8::MAX as usize) as u8,
            distance: quantize_distance(distance_sq, max_distance_sq, u16::MAX),
        }
    }));
}
