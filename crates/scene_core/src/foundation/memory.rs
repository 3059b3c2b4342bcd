//! Memory management utilities
//!
//! Fixed-capacity pool allocator used for every per-scene resource (nodes,
//! transforms, bounding spheres, partition records) and for pipelines.
//!
//! ```text
//! PoolAllocator<T>
//!     ├── entries[capacity]   (value + generation)
//!     └── free_list           (indices available for allocation)
//!              ↓
//!       PoolHandle<T> { index, generation }
//! ```
//!
//! Capacity is fixed at construction. Running out of slots is a
//! configuration error, so `allocate` reports [`PoolError::Exhausted`] and
//! never grows the pool.

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use thiserror::Error;

/// Pool allocation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Every slot of the pool is in use
    #[error("{pool} exhausted (capacity {capacity})")]
    Exhausted {
        /// Pool label
        pool: &'static str,
        /// Fixed capacity of the pool
        capacity: usize,
    },

    /// The handle was released, or the pool was cleared since it was issued
    #[error("stale handle for {pool}")]
    StaleHandle {
        /// Pool label
        pool: &'static str,
    },
}

/// Handle for a pooled value
///
/// Handles carry a generation counter, so a handle kept after its slot was
/// released (or the whole pool cleared) never resolves to the slot's next
/// occupant.
pub struct PoolHandle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolHandle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index inside the pool
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

// Manual impls: derives would require `T` itself to be Copy/Eq/Hash.
impl<T> Clone for PoolHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolHandle<T> {}

impl<T> PartialEq for PoolHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for PoolHandle<T> {}

impl<T> Hash for PoolHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for PoolHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolHandle({}v{})", self.index, self.generation)
    }
}

/// Pool entry
struct PoolEntry<T> {
    /// Stored value, `None` while the slot is free
    value: Option<T>,
    /// Current generation counter
    generation: u32,
}

/// Memory pool allocator for fixed-size objects
pub struct PoolAllocator<T> {
    /// Slot storage, allocated once
    entries: Vec<PoolEntry<T>>,
    /// Free list of available indices
    free_list: VecDeque<u32>,
    /// Label used in logs and errors
    label: &'static str,
}

impl<T> PoolAllocator<T> {
    /// Create a new pool allocator with a fixed number of slots
    pub fn new(label: &'static str, capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || PoolEntry {
            value: None,
            generation: 0,
        });

        log::debug!("Created {} with {} slots", label, capacity);

        Self {
            entries,
            free_list: (0..capacity as u32).collect(),
            label,
        }
    }

    /// Move `value` into a free slot
    pub fn allocate(&mut self, value: T) -> Result<PoolHandle<T>, PoolError> {
        let Some(index) = self.free_list.pop_front() else {
            log::error!("{} exhausted (capacity {})", self.label, self.capacity());
            return Err(PoolError::Exhausted {
                pool: self.label,
                capacity: self.capacity(),
            });
        };

        let entry = &mut self.entries[index as usize];
        entry.value = Some(value);
        Ok(PoolHandle::new(index, entry.generation))
    }

    /// Return a slot to the free list, handing back the value it held
    pub fn release(&mut self, handle: PoolHandle<T>) -> Result<T, PoolError> {
        let entry = self
            .entries
            .get_mut(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation && entry.value.is_some())
            .ok_or(PoolError::StaleHandle { pool: self.label })?;

        let value = entry.value.take().ok_or(PoolError::StaleHandle { pool: self.label })?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_list.push_back(handle.index);
        Ok(value)
    }

    /// Mark every slot free without giving back the backing storage
    ///
    /// Outstanding handles are invalidated.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.value.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
            }
            self.free_list.push_back(index as u32);
        }
    }

    /// Get a value by handle
    pub fn get(&self, handle: PoolHandle<T>) -> Option<&T> {
        self.entries
            .get(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)
            .and_then(|entry| entry.value.as_ref())
    }

    /// Get a mutable value by handle
    pub fn get_mut(&mut self, handle: PoolHandle<T>) -> Option<&mut T> {
        self.entries
            .get_mut(handle.index as usize)
            .filter(|entry| entry.generation == handle.generation)
            .and_then(|entry| entry.value.as_mut())
    }

    /// Whether `handle` refers to a live slot
    pub fn contains(&self, handle: PoolHandle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of slots in use
    pub fn len(&self) -> usize {
        self.capacity() - self.free_list.len()
    }

    /// Whether no slot is in use
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of free slots
    pub fn available(&self) -> usize {
        self.free_list.len()
    }

    /// Fixed number of slots
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Pool label
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Iterate over live values with their handles
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle<T>, &T)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            entry
                .value
                .as_ref()
                .map(|value| (PoolHandle::new(index as u32, entry.generation), value))
        })
    }
}

impl<T> fmt::Debug for PoolAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("label", &self.label)
            .field("in_use", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
