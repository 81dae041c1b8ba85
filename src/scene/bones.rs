use glam::Mat4;

/// Double-buffered skinning matrices. Each frame writes one half while the
/// other still holds last frame's poses for motion vectors.
pub struct BoneBuffer {
    matrices: Vec<Mat4>,
    half_capacity: usize,
    front: usize,
    used: usize,
}

impl BoneBuffer {
    pub fn new(matrices_per_frame: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; matrices_per_frame * 2],
            half_capacity: matrices_per_frame,
            front: 0,
            used: 0,
        }
    }

    /// Copies `bones` into the front half and returns their offset within it.
    /// Overflowing the per-frame budget is fatal.
    pub fn allocate(&mut self, bones: &[Mat4]) -> u32 {
        let offset = self.used;
        if offset + bones.len() > self.half_capacity {
            panic!(
                "bone buffer overflow: {} matrices requested with {} of {} in use",
                bones.len(),
                offset,
                self.half_capacity
            );
        }

        let start = self.front_base() as usize + offset;
        self.matrices[start..start + bones.len()].copy_from_slice(bones);
        self.used += bones.len();
        offset as u32
    }

    pub fn front_base(&self) -> u32 {
        (self.front * self.half_capacity) as u32
    }

    pub fn back_base(&self) -> u32 {
        ((1 - self.front) * self.half_capacity) as u32
    }

    /// Makes the current half the previous one and starts a fresh frame.
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
        self.used = 0;
    }

    pub fn used(&self) -> usize {
        self.used
    }

    /// Both halves, ready for upload.
    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices
    }
}
