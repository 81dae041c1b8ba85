use std::marker::PhantomData;

/// Generational handle into a [`Registry`]. Once the entry behind it has been
/// freed the handle stays invalid forever, even after its slot is reused.
pub struct RegistryHandle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RegistryHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RegistryHandle<T> {}

impl<T> PartialEq for RegistryHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for RegistryHandle<T> {}

impl<T> std::hash::Hash for RegistryHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> std::fmt::Debug for RegistryHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RegistryHandle({}v{})", self.index, self.generation)
    }
}

impl<T> RegistryHandle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("handle index {index} was never issued by this registry")]
    InvalidHandle { index: u32 },
    #[error("handle {index}v{generation} refers to a freed entry")]
    StaleHandle { index: u32, generation: u32 },
    #[error("handle {index} is queued for removal")]
    PendingFree { index: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    dense: Option<u32>,
    pending_free: bool,
}

/// Dense storage addressed through generational handles.
///
/// Values live in a packed array so per-frame passes can walk them by dense
/// slot index. Frees are deferred: [`Registry::free`] invalidates the handle
/// right away, but the value keeps its slot until
/// [`Registry::apply_deferred_frees`] runs at the start of the next frame.
/// Dense indices are therefore stable for the whole of a frame.
pub struct Registry<T> {
    slots: Vec<Slot>,
    values: Vec<T>,
    dense_to_slot: Vec<u32>,
    free_slots: Vec<u32>,
    pending: Vec<u32>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            values: Vec::new(),
            dense_to_slot: Vec::new(),
            free_slots: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn register(&mut self, value: T) -> RegistryHandle<T> {
        let dense = self.values.len() as u32;
        self.values.push(value);

        let index = match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.dense = Some(dense);
                slot.pending_free = false;
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    dense: Some(dense),
                    pending_free: false,
                });
                (self.slots.len() - 1) as u32
            }
        };

        self.dense_to_slot.push(index);
        RegistryHandle::new(index, self.slots[index as usize].generation)
    }

    /// Dense slot index of a live handle.
    pub fn slot_of(&self, handle: RegistryHandle<T>) -> Result<usize, RegistryError> {
        let slot = self
            .slots
            .get(handle.index as usize)
            .ok_or(RegistryError::InvalidHandle {
                index: handle.index,
            })?;

        if slot.generation != handle.generation {
            return Err(RegistryError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            });
        }
        if slot.pending_free {
            return Err(RegistryError::PendingFree {
                index: handle.index,
            });
        }

        slot.dense
            .map(|dense| dense as usize)
            .ok_or(RegistryError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            })
    }

    pub fn contains(&self, handle: RegistryHandle<T>) -> bool {
        self.slot_of(handle).is_ok()
    }

    pub fn get(&self, handle: RegistryHandle<T>) -> Result<&T, RegistryError> {
        let dense = self.slot_of(handle)?;
        Ok(&self.values[dense])
    }

    pub fn get_mut(&mut self, handle: RegistryHandle<T>) -> Result<&mut T, RegistryError> {
        let dense = self.slot_of(handle)?;
        Ok(&mut self.values[dense])
    }

    /// Replaces the value behind `handle`, returning the previous one.
    pub fn update(&mut self, handle: RegistryHandle<T>, value: T) -> Result<T, RegistryError> {
        let dense = self.slot_of(handle)?;
        Ok(std::mem::replace(&mut self.values[dense], value))
    }

    /// Invalidates `handle` and queues its value for removal.
    pub fn free(&mut self, handle: RegistryHandle<T>) -> Result<(), RegistryError> {
        self.slot_of(handle)?;
        self.slots[handle.index as usize].pending_free = true;
        self.pending.push(handle.index);
        Ok(())
    }

    pub fn pending_frees(&self) -> usize {
        self.pending.len()
    }

    /// Physically removes every queued entry and returns the removed values.
    /// Surviving values may move to a new dense slot.
    pub fn apply_deferred_frees(&mut self) -> Vec<T> {
        let mut removed = Vec::with_capacity(self.pending.len());

        for index in std::mem::take(&mut self.pending) {
            let slot = &mut self.slots[index as usize];
            let Some(dense) = slot.dense.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            slot.pending_free = false;
            self.free_slots.push(index);

            let dense = dense as usize;
            removed.push(self.values.swap_remove(dense));
            self.dense_to_slot.swap_remove(dense);
            if let Some(&moved) = self.dense_to_slot.get(dense) {
                self.slots[moved as usize].dense = Some(dense as u32);
            }
        }

        removed
    }

    /// Handle of the value stored at a dense slot.
    pub fn handle_at(&self, dense: usize) -> Option<RegistryHandle<T>> {
        let index = *self.dense_to_slot.get(dense)?;
        Some(RegistryHandle::new(
            index,
            self.slots[index as usize].generation,
        ))
    }

    /// Values in dense slot order, including entries queued for removal.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegistryHandle<T>, &T)> + '_ {
        self.dense_to_slot
            .iter()
            .zip(self.values.iter())
            .filter_map(move |(&index, value)| {
                let slot = &self.slots[index as usize];
                (!slot.pending_free).then(|| (RegistryHandle::new(index, slot.generation), value))
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
