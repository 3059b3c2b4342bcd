//! Specialized collection types

pub use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable identifier of a scene owned by a renderer
    pub struct SceneId;

    /// Stable identifier of a camera owned by a renderer
    pub struct CameraId;
}

/// Ordered set of ids preserving insertion order
///
/// Used for the active-scene and active-camera lists, where iteration order
/// is the activation order and duplicates are meaningless.
#[derive(Debug, Clone)]
pub struct ActiveList<K> {
    items: Vec<K>,
}

impl<K: Copy + PartialEq> ActiveList<K> {
    /// Create an empty list with room for `capacity` ids
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append `key` unless it is already present; returns whether it was added
    pub fn insert(&mut self, key: K) -> bool {
        if self.contains(key) {
            return false;
        }
        self.items.push(key);
        true
    }

    /// Remove `key`, keeping the order of the others; returns whether it was present
    pub fn remove(&mut self, key: K) -> bool {
        let before = self.items.len();
        self.items.retain(|k| *k != key);
        self.items.len() != before
    }

    /// Whether `key` is in the list
    pub fn contains(&self, key: K) -> bool {
        self.items.contains(&key)
    }

    /// Ids in insertion order
    pub fn as_slice(&self) -> &[K] {
        &self.items
    }

    /// Number of ids
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Copy + PartialEq> Default for ActiveList<K> {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_list_keeps_insertion_order() {
        let mut ids: SlotMap<CameraId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());
        let c = ids.insert(());

        let mut list = ActiveList::default();
        assert!(list.insert(b));
        assert!(list.insert(a));
        assert!(!list.insert(b));
        assert!(list.insert(c));
        assert!(list.remove(a));
        assert!(!list.remove(a));

        assert_eq!(list.as_slice(), &[b, c]);
    }
}
