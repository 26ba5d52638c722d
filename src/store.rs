use std::collections::HashMap;
use std::hash::Hash;

/// Entities stored in an [`EntityStore`] expose a stable key.
pub trait Keyed {
    type Key: Copy + Eq + Hash;
    fn key(&self) -> Self::Key;
}

/// Dense arena keyed by stable id.
///
/// Items live contiguously in a `Vec` for fast iteration; an index map gives
/// O(1) lookup, and removal uses `swap_remove` so it is O(1) as well. Removal
/// does not preserve iteration order.
#[derive(Debug, Clone)]
pub struct EntityStore<T: Keyed> {
    items: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Keyed> EntityStore<T> {
    pub fn new() -> Self {
        EntityStore {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts an item, replacing any existing item with the same key.
    pub fn insert(&mut self, item: T) {
        let key = item.key();
        if let Some(&slot) = self.index.get(&key) {
            self.items[slot] = item;
        } else {
            self.index.insert(key, self.items.len());
            self.items.push(item);
        }
    }

    pub fn contains(&self, key: T::Key) -> bool {
        self.index.contains_key(&key)
    }

    pub fn get(&self, key: T::Key) -> Option<&T> {
        self.index.get(&key).map(|&slot| &self.items[slot])
    }

    pub fn get_mut(&mut self, key: T::Key) -> Option<&mut T> {
        match self.index.get(&key) {
            Some(&slot) => self.items.get_mut(slot),
            None => None,
        }
    }

    /// Removes and returns the item with `key`. The last item moves into the
    /// vacated slot.
    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        let slot = self.index.remove(&key)?;
        let removed = self.items.swap_remove(slot);
        if let Some(moved) = self.items.get(slot) {
            self.index.insert(moved.key(), slot);
        }
        Some(removed)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Mutable slice access. Keys must not be changed through it.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

impl<T: Keyed> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        value: &'static str,
    }

    impl Keyed for Item {
        type Key = u32;
        fn key(&self) -> u32 {
            self.id
        }
    }

    fn item(id: u32, value: &'static str) -> Item {
        Item { id, value }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut store = EntityStore::new();
        store.insert(item(1, "a"));
        store.insert(item(2, "b"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(2).map(|i| i.value), Some("b"));
        assert!(store.get(3).is_none());
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut store = EntityStore::new();
        store.insert(item(1, "a"));
        store.insert(item(1, "z"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).map(|i| i.value), Some("z"));
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut store = EntityStore::new();
        for id in 0..5 {
            store.insert(item(id, "x"));
        }
        // Removing from the middle moves the last item into slot 1
        let removed = store.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(store.len(), 4);
        assert!(!store.contains(1));
        for id in [0, 2, 3, 4] {
            assert_eq!(store.get(id).map(|i| i.id), Some(id));
        }
        assert!(store.remove(1).is_none());

        // Removing the last item leaves nothing to relocate
        assert!(store.remove(4).is_some());
        assert_eq!(store.get(3).map(|i| i.id), Some(3));
    }

    #[test]
    fn test_get_mut() {
        let mut store = EntityStore::new();
        store.insert(item(7, "before"));
        if let Some(i) = store.get_mut(7) {
            i.value = "after";
        }
        assert_eq!(store.get(7).map(|i| i.value), Some("after"));
    }
}
