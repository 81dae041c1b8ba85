/// Per-frame bump allocator of `u32` words for draw-list scratch data.
///
/// Running out of space is a budget violation and panics.
pub struct FrameArena {
    words: Vec<u32>,
    used: usize,
    high_water: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaMarker(usize);

impl FrameArena {
    pub fn new(capacity_words: usize) -> Self {
        Self {
            words: vec![0; capacity_words],
            used: 0,
            high_water: 0,
        }
    }

    /// Zero-filled scratch of `len` words, valid until the arena is reset or
    /// rewound past it.
    pub fn alloc(&mut self, len: usize) -> &mut [u32] {
        self.alloc_filled(len, 0)
    }

    pub fn alloc_filled(&mut self, len: usize, value: u32) -> &mut [u32] {
        let start = self.used;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.words.len())
            .unwrap_or_else(|| {
                panic!(
                    "scratch arena exhausted: requested {} words with {} of {} in use",
                    len,
                    start,
                    self.words.len()
                )
            });

        self.used = end;
        self.high_water = self.high_water.max(end);
        let slice = &mut self.words[start..end];
        slice.fill(value);
        slice
    }

    pub fn marker(&self) -> ArenaMarker {
        ArenaMarker(self.used)
    }

    pub fn free_to_marker(&mut self, marker: ArenaMarker) {
        debug_assert!(marker.0 <= self.used, "arena marker is ahead of the arena");
        self.used = self.used.min(marker.0);
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Largest `used()` seen since creation.
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}
